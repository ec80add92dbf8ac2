//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sri_core::ValidationErrors;
use sri_gate::ReviewError;
use sri_storage::StorageError;
use tracing::error;

/// Message returned with every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Erreur interne critique du service d'Agent.";

/// Errors surfaced to HTTP callers.
///
/// A failed or low-confidence judgment is not an error: it is a valid
/// decision routed to review.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Profile failed validation
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Request body could not be read
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Review queue refused the operation
    #[error(transparent)]
    Review(#[from] ReviewError),

    /// Recommendation log failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Any other plumbing fault
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "non_field_errors": [message] })),
            )
                .into_response(),
            ApiError::Review(err) => {
                let status = match err {
                    ReviewError::NotFound(_) => StatusCode::NOT_FOUND,
                    ReviewError::AlreadyResolved { .. } => StatusCode::CONFLICT,
                    ReviewError::InvalidState(_) => StatusCode::BAD_REQUEST,
                };
                (status, Json(json!({ "error": err.to_string() }))).into_response()
            }
            ApiError::Storage(err) => internal(err.to_string()),
            ApiError::Internal(detail) => internal(detail),
        }
    }
}

fn internal(detail: String) -> Response {
    error!("Request failed: {}", detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE, "detail": detail })),
    )
        .into_response()
}
