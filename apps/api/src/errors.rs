use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::pipeline::PipelineError;
use crate::llm_client::CompletionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every message is user-facing: these are the errors the form displays.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// Aggregated missing-input warning; `missing` lists the item labels.
    #[error("{message}")]
    MissingInput {
        message: String,
        missing: Vec<String>,
    },

    #[error("{0}")]
    Extraction(String),

    #[error("{0}")]
    CompletionAuth(String),

    #[error("{0}")]
    CompletionQuota(String),

    #[error("{0}")]
    Completion(String),

    #[error("{0}")]
    Render(String),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        let message = err.to_string();
        match err {
            PipelineError::MissingInput { missing, notices } => {
                let message = notices
                    .into_iter()
                    .chain(std::iter::once(message))
                    .collect::<Vec<_>>()
                    .join("\n");
                AppError::MissingInput {
                    message,
                    missing: missing.iter().map(|m| m.label().to_string()).collect(),
                }
            }
            PipelineError::Extraction(_) => AppError::Extraction(message),
            PipelineError::Completion { source, .. } => match source {
                CompletionError::Authentication { .. } => AppError::CompletionAuth(message),
                CompletionError::Quota { .. } => AppError::CompletionQuota(message),
                _ => AppError::Completion(message),
            },
            PipelineError::Render(_) => AppError::Render(message),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Validation(format!("malformed form data: {}", err.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::MissingInput { message, missing } => {
                tracing::info!("Generation refused: {message}");
                (
                    StatusCode::BAD_REQUEST,
                    "MISSING_INPUT",
                    message.clone(),
                    Some(json!(missing)),
                )
            }
            AppError::Extraction(msg) => {
                tracing::warn!("Extraction error: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_ERROR",
                    msg.clone(),
                    None,
                )
            }
            AppError::CompletionAuth(msg) => {
                tracing::warn!("Completion auth error: {msg}");
                (
                    StatusCode::UNAUTHORIZED,
                    "COMPLETION_AUTH_ERROR",
                    msg.clone(),
                    None,
                )
            }
            AppError::CompletionQuota(msg) => {
                tracing::warn!("Completion quota error: {msg}");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "COMPLETION_QUOTA_ERROR",
                    msg.clone(),
                    None,
                )
            }
            AppError::Completion(msg) => {
                tracing::error!("Completion error: {msg}");
                (StatusCode::BAD_GATEWAY, "COMPLETION_ERROR", msg.clone(), None)
            }
            AppError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    msg.clone(),
                    None,
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
