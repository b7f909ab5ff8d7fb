//! Application-level error type for HTTP handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rapport_jobs::StartError;
use serde_json::json;

/// Errors a handler can surface to the client.
///
/// Implements [`IntoResponse`] to produce consistent
/// `{ "error": ..., "code": ... }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No job is registered under the given id.
    #[error("job {0} not found")]
    JobNotFound(String),

    /// The job exists but has not reached `Done` yet.
    #[error("analysis is not finished yet")]
    NotReady,

    /// The request payload failed validation.
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StartError> for AppError {
    fn from(err: StartError) -> Self {
        match err {
            StartError::InvalidInput(msg) => Self::Validation(msg.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::JobNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            // 409: the resource exists but is not in a state where the
            // result can be served yet.
            AppError::NotReady => (StatusCode::CONFLICT, "NOT_READY", self.to_string()),
            AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", self.to_string())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
