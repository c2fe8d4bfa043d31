use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{PreferencesQuery, UpdatePreferencesRequest};
use super::repo_types::UserPreferences;
use super::services;
use crate::{error::PlanError, state::AppState};

pub fn preferences_routes() -> Router<AppState> {
    Router::new().route(
        "/user/preferences",
        get(get_preferences).post(save_preferences),
    )
}

#[instrument(skip(state))]
pub async fn get_preferences(
    State(state): State<AppState>,
    Query(q): Query<PreferencesQuery>,
) -> Result<Json<UserPreferences>, (StatusCode, String)> {
    let user_id = q
        .user_id
        .ok_or_else(|| PlanError::invalid("userId is required"))?;
    let prefs = services::resolve(state.store.as_ref(), user_id)
        .await
        .map_err(PlanError::from)?;
    Ok(Json(prefs))
}

#[instrument(skip(state, payload))]
pub async fn save_preferences(
    State(state): State<AppState>,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> Result<Json<UserPreferences>, (StatusCode, String)> {
    let prefs = services::update(state.store.as_ref(), payload).await?;
    info!(user_id = %prefs.user_id, "preferences updated");
    Ok(Json(prefs))
}
