use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{NutritionQuery, WeeklyNutritionReport};
use super::services;
use crate::{dates::parse_week_start, error::PlanError, state::AppState};

pub fn nutrition_routes() -> Router<AppState> {
    Router::new().route("/nutrition/weekly", get(weekly_nutrition))
}

#[instrument(skip(state))]
pub async fn weekly_nutrition(
    State(state): State<AppState>,
    Query(q): Query<NutritionQuery>,
) -> Result<Json<WeeklyNutritionReport>, (StatusCode, String)> {
    let user_id = q
        .user_id
        .ok_or_else(|| PlanError::invalid("userId is required"))?;
    let week_start = parse_week_start(q.week_start_date.as_deref())?;
    let report = services::weekly_report(state.store.as_ref(), user_id, week_start).await?;
    Ok(Json(report))
}
