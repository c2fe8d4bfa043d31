use serde::{Deserialize, Serialize};

use super::model::Recipe;

#[derive(Debug, Default, Deserialize)]
pub struct RecipeQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    /// Comma-separated; every tag must be present.
    pub tags: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecipeList {
    pub recipes: Vec<Recipe>,
    pub total: usize,
}
