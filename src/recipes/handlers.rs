use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};

use super::dto::{RecipeList, RecipeQuery};
use super::services;
use crate::state::AppState;

pub fn recipe_routes() -> Router<AppState> {
    Router::new().route("/recipes", get(list_recipes))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(q): Query<RecipeQuery>,
) -> Result<Json<RecipeList>, (StatusCode, String)> {
    let recipes = services::search(state.store.as_ref(), &q).await?;
    debug!(total = recipes.len(), "recipes listed");
    Ok(Json(RecipeList {
        total: recipes.len(),
        recipes,
    }))
}
