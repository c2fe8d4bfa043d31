mod dto;
mod handlers;
pub(crate) mod model;
pub(crate) mod repo;
pub(crate) mod repo_types;
mod services;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::recipe_routes()
}
