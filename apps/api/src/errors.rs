use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::location::selection::SelectionCheck;
use crate::profile::store::ProfileStoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Inconsistent location: {0}")]
    InconsistentLocation(SelectionCheck),

    #[error("Profile store error: {0}")]
    ProfileStore(#[from] ProfileStoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InconsistentLocation(check) => (
                StatusCode::BAD_REQUEST,
                "INCONSISTENT_LOCATION",
                check.to_string(),
            ),
            AppError::ProfileStore(e) => {
                tracing::error!("Profile store error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "PROFILE_STORE_ERROR",
                    "The profile store could not be reached".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
