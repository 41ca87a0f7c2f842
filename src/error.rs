use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Failures of schedule generation itself, independent of transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("{0}")]
    Configuration(String),

    #[error("No workout plan catalog is available")]
    CatalogUnavailable,

    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),
}

impl ScheduleError {
    pub fn no_availability() -> Self {
        ScheduleError::Configuration(
            "No available days set. Please set your available days first.".to_string(),
        )
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Plan generator error: {0}")]
    PlanGenerator(String),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Schedule(e) => {
                let status = match e {
                    ScheduleError::Configuration(_) | ScheduleError::PreconditionViolation(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    ScheduleError::CatalogUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, e.to_string())
            }
            AppError::PlanGenerator(msg) => {
                warn!("plan generator error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Workout plan generation failed".to_string(),
                )
            }
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}
