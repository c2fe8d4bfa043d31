use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{
    DeleteShoppingListQuery, GenerateShoppingListRequest, ShoppingListQuery,
    ShoppingListsResponse, ShoppingUpdateResponse, UpdateShoppingListRequest,
};
use super::repo_types::ShoppingList;
use super::services;
use crate::state::AppState;

pub fn shopping_routes() -> Router<AppState> {
    Router::new()
        .route("/shopping-list/generate", post(generate_shopping_list))
        .route(
            "/shopping-list",
            get(get_shopping_lists)
                .put(update_shopping_list)
                .delete(delete_shopping_list),
        )
}

#[instrument(skip(state, payload))]
pub async fn generate_shopping_list(
    State(state): State<AppState>,
    Json(payload): Json<GenerateShoppingListRequest>,
) -> Result<(StatusCode, Json<ShoppingList>), (StatusCode, String)> {
    let list = services::generate(state.store.as_ref(), payload).await?;
    info!(list_id = %list.id, items = list.items.len(), "shopping list generated");
    Ok((StatusCode::CREATED, Json(list)))
}

#[instrument(skip(state))]
pub async fn get_shopping_lists(
    State(state): State<AppState>,
    Query(q): Query<ShoppingListQuery>,
) -> Result<Json<ShoppingListsResponse>, (StatusCode, String)> {
    let lists = services::fetch(state.store.as_ref(), q).await?;
    Ok(Json(lists))
}

#[instrument(skip(state, payload))]
pub async fn update_shopping_list(
    State(state): State<AppState>,
    Json(payload): Json<UpdateShoppingListRequest>,
) -> Result<Json<ShoppingUpdateResponse>, (StatusCode, String)> {
    let updated = services::update(state.store.as_ref(), payload).await?;
    Ok(Json(updated))
}

#[instrument(skip(state))]
pub async fn delete_shopping_list(
    State(state): State<AppState>,
    Query(q): Query<DeleteShoppingListQuery>,
) -> Result<StatusCode, (StatusCode, String)> {
    services::delete(state.store.as_ref(), q.list_id).await?;
    info!(list_id = ?q.list_id, "shopping list deleted");
    Ok(StatusCode::NO_CONTENT)
}
