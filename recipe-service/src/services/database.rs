use crate::models::{Recipe, RecipeQuery, RecipeUpdate};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

const RECIPES_COLLECTION: &str = "recipes";

#[derive(Clone)]
pub struct RecipeDb {
    client: MongoClient,
    db: Database,
}

impl RecipeDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for recipe-service");

        // Recipe names are unique
        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .name("name_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.recipes()
            .create_index(name_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create name index on recipes collection: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        tracing::info!("Created unique index on recipes.name");

        // Descending cook time for "longest first" listings
        let cook_time_index = IndexModel::builder()
            .keys(doc! { "cookTime": -1 })
            .options(
                IndexOptions::builder()
                    .name("cook_time_idx".to_string())
                    .sparse(true)
                    .build(),
            )
            .build();

        self.recipes()
            .create_index(cook_time_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create cookTime index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        tracing::info!("Created index on recipes.cookTime");

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    pub fn recipes(&self) -> Collection<Recipe> {
        self.db.collection(RECIPES_COLLECTION)
    }

    fn raw_recipes(&self) -> Collection<Document> {
        self.db.collection(RECIPES_COLLECTION)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Validate and insert a new recipe, returning it with its generated id.
    pub async fn create(&self, mut recipe: Recipe) -> Result<Recipe, AppError> {
        recipe.id = None;
        self.insert(&mut recipe).await?;
        Ok(recipe)
    }

    /// Insert the recipe when it has no id yet, otherwise replace the stored
    /// document with it. Validation runs first either way.
    pub async fn save(&self, recipe: &mut Recipe) -> Result<(), AppError> {
        match recipe.id {
            None => self.insert(recipe).await,
            Some(id) => {
                recipe.normalized_and_validated()?;

                let result = self
                    .recipes()
                    .replace_one(doc! { "_id": id }, &*recipe, None)
                    .await
                    .map_err(|e| {
                        tracing::error!(recipe_id = %id, "Failed to replace recipe: {}", e);
                        AppError::from(e)
                    })?;

                if result.matched_count == 0 {
                    return Err(AppError::NotFound(anyhow::anyhow!(
                        "Recipe {} not found",
                        id
                    )));
                }

                tracing::info!(recipe_id = %id, name = %recipe.name, "Recipe saved");
                Ok(())
            }
        }
    }

    async fn insert(&self, recipe: &mut Recipe) -> Result<(), AppError> {
        recipe.normalized_and_validated()?;

        let result = self
            .recipes()
            .insert_one(&*recipe, None)
            .await
            .map_err(|e| {
                tracing::error!(name = %recipe.name, "Failed to insert recipe: {}", e);
                AppError::from(e)
            })?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::InternalError(anyhow::anyhow!(
                "MongoDB returned a non-ObjectId _id: {}",
                result.inserted_id
            ))
        })?;
        recipe.id = Some(id);

        tracing::info!(recipe_id = %id, name = %recipe.name, "Recipe created");
        Ok(())
    }

    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<Recipe>, AppError> {
        self.recipes()
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!(recipe_id = %id, "Failed to find recipe: {}", e);
                AppError::from(e)
            })
    }

    pub async fn find_one(&self, query: RecipeQuery) -> Result<Option<Recipe>, AppError> {
        let mut recipes = self.find(query.limit(1)).await?;
        Ok(recipes.pop())
    }

    /// Run a query and decode full recipes. Fields left out by a projection
    /// fall back to their defaults; use [`RecipeDb::find_documents`] to see
    /// exactly what the server returned.
    pub async fn find(&self, query: RecipeQuery) -> Result<Vec<Recipe>, AppError> {
        let (filter, options) = query.into_parts();

        let cursor = self.recipes().find(filter, options).await.map_err(|e| {
            tracing::error!("Failed to query recipes: {}", e);
            AppError::from(e)
        })?;

        let recipes: Vec<Recipe> = cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect recipes: {}", e);
            AppError::from(e)
        })?;

        Ok(recipes)
    }

    pub async fn find_documents(&self, query: RecipeQuery) -> Result<Vec<Document>, AppError> {
        let (filter, options) = query.into_parts();

        let cursor = self.raw_recipes().find(filter, options).await.map_err(|e| {
            tracing::error!("Failed to query recipe documents: {}", e);
            AppError::from(e)
        })?;

        let documents: Vec<Document> = cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect recipe documents: {}", e);
            AppError::from(e)
        })?;

        Ok(documents)
    }

    pub async fn count(&self, query: RecipeQuery) -> Result<u64, AppError> {
        let options = query.count_options();
        self.recipes()
            .count_documents(query.filter_document(), options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count recipes: {}", e);
                AppError::from(e)
            })
    }

    /// Apply field-level changes and return the updated recipe.
    pub async fn update(&self, id: ObjectId, update: RecipeUpdate) -> Result<Recipe, AppError> {
        if update.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Recipe update has no fields to change"
            )));
        }
        let update = update.into_update_document()?;

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let recipe = self
            .recipes()
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await
            .map_err(|e| {
                tracing::error!(recipe_id = %id, "Failed to update recipe: {}", e);
                AppError::from(e)
            })?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Recipe {} not found", id)))?;

        tracing::info!(recipe_id = %id, "Recipe updated");
        Ok(recipe)
    }

    /// Returns whether a recipe was removed.
    pub async fn delete(&self, id: ObjectId) -> Result<bool, AppError> {
        let result = self
            .recipes()
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!(recipe_id = %id, "Failed to delete recipe: {}", e);
                AppError::from(e)
            })?;

        Ok(result.deleted_count > 0)
    }

    pub async fn delete_all(&self) -> Result<u64, AppError> {
        let result = self
            .recipes()
            .delete_many(doc! {}, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete recipes: {}", e);
                AppError::from(e)
            })?;

        tracing::info!(deleted = result.deleted_count, "Deleted all recipes");
        Ok(result.deleted_count)
    }
}
