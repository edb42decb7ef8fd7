use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::{Deserialize, Deserializer, Serialize};
use service_core::error::AppError;
use validator::Validate;

fn default_amount() -> f64 {
    1.0
}

/// Lowercase and trim a unit of measure. Blank input clears it.
pub fn normalize_measure(measure: &str) -> Option<String> {
    let normalized = measure.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

fn deserialize_measure<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(normalize_measure))
}

/// A line in a recipe's ingredient list. Embedded in the recipe document and
/// has no identity of its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Ingredient {
    #[serde(default)]
    #[validate(length(min = 1, message = "Ingredient name is required"))]
    pub ingredient: String,
    #[serde(
        default,
        deserialize_with = "deserialize_measure",
        skip_serializing_if = "Option::is_none"
    )]
    measure: Option<String>,
    #[serde(default = "default_amount")]
    pub amount: f64,
}

impl Ingredient {
    pub fn new(ingredient: impl Into<String>) -> Self {
        let ingredient: String = ingredient.into();
        Self {
            ingredient: ingredient.trim().to_string(),
            measure: None,
            amount: default_amount(),
        }
    }

    pub fn with_measure(mut self, measure: impl AsRef<str>) -> Self {
        self.set_measure(measure);
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn set_measure(&mut self, measure: impl AsRef<str>) {
        self.measure = normalize_measure(measure.as_ref());
    }

    pub fn measure(&self) -> Option<&str> {
        self.measure.as_deref()
    }

    fn normalize(&mut self) {
        self.ingredient = self.ingredient.trim().to_string();
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Recipe name is required"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<i32>,
    #[serde(default)]
    #[validate(nested)]
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: name.as_ref().trim().to_string(),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_cook_time(mut self, minutes: i32) -> Self {
        self.cook_time = Some(minutes);
        self
    }

    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.push_ingredient(ingredient);
        self
    }

    pub fn push_ingredient(&mut self, ingredient: Ingredient) {
        self.ingredients.push(ingredient);
    }

    /// Trim the name and ingredient names in place. Runs before every
    /// validation so a whitespace-only value counts as missing.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        for ingredient in &mut self.ingredients {
            ingredient.normalize();
        }
    }

    pub fn normalized_and_validated(&mut self) -> Result<(), AppError> {
        self.normalize();
        self.validate()?;
        Ok(())
    }
}

/// Field-level changes applied with `$set`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct RecipeUpdate {
    #[validate(length(min = 1, message = "Recipe name is required"))]
    pub name: Option<String>,
    pub source: Option<String>,
    pub cook_time: Option<i32>,
    pub ingredients: Option<Vec<Ingredient>>,
}

impl RecipeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.source.is_none()
            && self.cook_time.is_none()
            && self.ingredients.is_none()
    }

    /// Build the `$set` document, trimming and validating first.
    pub fn into_update_document(mut self) -> Result<Document, AppError> {
        if let Some(name) = self.name.as_mut() {
            *name = name.trim().to_string();
        }
        self.validate()?;

        let mut set = Document::new();
        if let Some(name) = self.name {
            set.insert("name", name);
        }
        if let Some(source) = self.source {
            set.insert("source", source);
        }
        if let Some(cook_time) = self.cook_time {
            set.insert("cookTime", cook_time);
        }
        if let Some(mut ingredients) = self.ingredients {
            for ingredient in &mut ingredients {
                ingredient.normalize();
                ingredient.validate()?;
            }
            let value = bson::to_bson(&ingredients).map_err(|e| {
                tracing::error!("Failed to serialize ingredients: {}", e);
                AppError::InternalError(anyhow::Error::new(e))
            })?;
            set.insert("ingredients", value);
        }

        Ok(doc! { "$set": set })
    }
}
