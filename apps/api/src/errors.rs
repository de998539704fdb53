use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::InferenceError;
use crate::storage::PersistenceError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Inference(e) => {
                tracing::error!("Inference error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INFERENCE_ERROR",
                    "All inference models failed".to_string(),
                )
            }
            AppError::Persistence(PersistenceError::MissingRecord(id)) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Interview {id} not found"),
            ),
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
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
