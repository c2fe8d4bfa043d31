use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::dto::{GenerateRequest, GenerateResponse, PartialResponse, SetSlotRequest, WeekQuery, WeekView};
use super::repo_types::MealPlanRecord;
use super::services;
use crate::{dates::parse_week_start, error::PlanError, state::AppState};

pub fn planner_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plan", get(get_week).put(set_slot))
        .route("/meal-plan/generate", post(generate))
        .route("/meal-plan/generate-partial", post(generate_partial))
}

#[instrument(skip(state, payload))]
pub async fn generate(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, (StatusCode, String)> {
    let generation = &state.config.generation;
    let req = payload.validate(generation.recent_meals_days)?;
    let today = OffsetDateTime::now_utc().date();
    let store = state.store.as_ref();

    let plan =
        services::generate_weekly_plan(store, generation, &req, generation.random_source(), today)
            .await?;
    let weekly_plan_id = services::save_weekly_plan(store, req.user_id, &plan).await?;
    info!(user_id = %req.user_id, %weekly_plan_id, total_time = plan.total_time, "weekly plan stored");
    Ok(Json(GenerateResponse {
        weekly_plan_id,
        plan,
    }))
}

#[instrument(skip(state, payload))]
pub async fn generate_partial(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<PartialResponse>, (StatusCode, String)> {
    let generation = &state.config.generation;
    let (req, meal_type) = payload.validate_partial(generation.recent_meals_days)?;
    let today = OffsetDateTime::now_utc().date();
    let store = state.store.as_ref();

    let rng = generation.random_source();
    let plan =
        services::generate_partial_plan(store, generation, &req, meal_type, rng, today).await?;
    let weekly_plan_id = services::save_partial_plan(store, req.user_id, &plan).await?;
    info!(user_id = %req.user_id, %meal_type, "partial plan stored");
    Ok(Json(PartialResponse {
        weekly_plan_id,
        plan,
    }))
}

#[instrument(skip(state))]
pub async fn get_week(
    State(state): State<AppState>,
    Query(q): Query<WeekQuery>,
) -> Result<Json<WeekView>, (StatusCode, String)> {
    let user_id = q
        .user_id
        .ok_or_else(|| PlanError::invalid("userId is required"))?;
    let week_start = parse_week_start(q.week_start_date.as_deref())?;
    let view = services::view_week(state.store.as_ref(), user_id, week_start).await?;
    Ok(Json(view))
}

#[instrument(skip(state, payload))]
pub async fn set_slot(
    State(state): State<AppState>,
    Json(payload): Json<SetSlotRequest>,
) -> Result<Json<MealPlanRecord>, (StatusCode, String)> {
    let edit = payload.validate()?;
    let record = services::set_slot(state.store.as_ref(), edit).await?;
    Ok(Json(record))
}
