//! Query builder for the `recipes` collection.
//!
//! Everything here is handed to MongoDB as-is: filters use the server's query
//! language, projections and sorts become `FindOptions`.

use mongodb::bson::{doc, Bson, Document};
use mongodb::options::{CountOptions, FindOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn direction(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
    filter: Document,
    and: Vec<Bson>,
    projection: Document,
    sort: Document,
    limit: Option<i64>,
    skip: Option<u64>,
}

impl RecipeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a filter document into the query. A key that is already
    /// constrained gets both conditions under `$and`.
    pub fn filter(mut self, filter: Document) -> Self {
        for (key, value) in filter {
            if key == "$and" {
                match value {
                    Bson::Array(clauses) => self.and.extend(clauses),
                    other => self.and.push(other),
                }
                continue;
            }

            if let Some(existing) = self.filter.remove(&key) {
                let mut earlier = Document::new();
                earlier.insert(key.clone(), existing);
                let mut later = Document::new();
                later.insert(key, value);
                self.and.push(Bson::Document(earlier));
                self.and.push(Bson::Document(later));
            } else {
                self.filter.insert(key, value);
            }
        }
        self
    }

    pub fn name(self, name: impl AsRef<str>) -> Self {
        self.filter(doc! { "name": name.as_ref().trim() })
    }

    pub fn cook_time_greater_than(self, minutes: i32) -> Self {
        self.filter(doc! { "cookTime": { "$gt": minutes } })
    }

    /// Recipes whose ingredient list is shorter than `count`. Documents
    /// without an `ingredients` array count as empty.
    pub fn ingredient_count_less_than(self, count: i32) -> Self {
        self.filter(doc! {
            "$expr": {
                "$lt": [
                    { "$size": { "$ifNull": ["$ingredients", []] } },
                    count
                ]
            }
        })
    }

    /// Include only these fields. `_id` stays unless excluded.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for field in fields {
            self.projection.insert(field.into(), 1);
        }
        self
    }

    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.projection.insert(field.into(), 0);
        self
    }

    pub fn exclude_id(self) -> Self {
        self.exclude("_id")
    }

    /// Add a sort key. Keys apply in the order they were added.
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.insert(field.into(), order.direction());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn filter_document(&self) -> Document {
        let mut filter = self.filter.clone();
        if !self.and.is_empty() {
            filter.insert("$and", self.and.clone());
        }
        filter
    }

    pub fn find_options(&self) -> FindOptions {
        let mut options = FindOptions::default();
        if !self.projection.is_empty() {
            options.projection = Some(self.projection.clone());
        }
        if !self.sort.is_empty() {
            options.sort = Some(self.sort.clone());
        }
        options.limit = self.limit;
        options.skip = self.skip;
        options
    }

    pub fn count_options(&self) -> CountOptions {
        let mut options = CountOptions::default();
        options.limit = self.limit.and_then(|l| u64::try_from(l).ok());
        options.skip = self.skip;
        options
    }

    pub fn into_parts(self) -> (Document, FindOptions) {
        (self.filter_document(), self.find_options())
    }
}
