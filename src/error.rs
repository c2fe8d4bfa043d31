use axum::http::StatusCode;
use tracing::error;

/// Failure of a planner operation as seen by the caller.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Missing or malformed request parameters; retrying will not help.
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    /// Storage was unavailable or a query failed. Nothing was persisted by
    /// the failed call; the whole operation may be retried.
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl PlanError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        PlanError::InvalidInput(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PlanError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PlanError::NotFound(_) => StatusCode::NOT_FOUND,
            PlanError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PlanError> for (StatusCode, String) {
    fn from(e: PlanError) -> Self {
        let status = e.status();
        if status.is_server_error() {
            error!(error = %e, "request failed");
        }
        (status, e.to_string())
    }
}
