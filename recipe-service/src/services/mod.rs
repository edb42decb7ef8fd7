pub mod database;

pub use database::RecipeDb;
