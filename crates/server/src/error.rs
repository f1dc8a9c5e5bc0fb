//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use stemtutor_core::AppError;
use thiserror::Error;

/// Shown to chat clients when the tutor fails.
pub const SERVER_ERROR_RESPONSE: &str =
    "A severe server error occurred while processing your request.";

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No message provided")]
    MissingMessage,

    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("Tutor error: {0}")]
    Tutor(#[from] AppError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingMessage => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "No message provided" })),
            )
                .into_response(),
            ApiError::InvalidJson(reason) => {
                tracing::debug!("Rejected chat body: {}", reason);
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Invalid JSON body" })),
                )
                    .into_response()
            }
            ApiError::Tutor(err) => {
                tracing::error!("An error occurred in the tutor API: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal Server Error",
                        "response": SERVER_ERROR_RESPONSE,
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
