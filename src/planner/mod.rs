pub(crate) mod catalog;
mod curry;
mod dto;
pub(crate) mod engine;
mod handlers;
pub(crate) mod model;
mod persistence;
pub(crate) mod random;
mod recency;
pub(crate) mod repo;
pub(crate) mod repo_types;
pub(crate) mod resolve;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::planner_routes()
}
