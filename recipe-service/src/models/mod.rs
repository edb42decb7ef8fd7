pub mod query;
pub mod recipe;

pub use query::{RecipeQuery, SortOrder};
pub use recipe::{Ingredient, Recipe, RecipeUpdate};
