use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::extract::ExtractionError;
use crate::generation::validation::ValidationError;
use crate::llm_client::GenerationError;
use crate::render::RenderError;

const CONFIGURATION_MESSAGE: &str = "Server configuration error. Please contact support.";
const INVALID_FORMAT_MESSAGE: &str = "Invalid input format for resume generation";
const THROTTLED_MESSAGE: &str = "Too many requests. Please try again in a few moments.";
const GENERIC_MESSAGE: &str = "An error occurred. Please try again later.";
const FALLBACK_MESSAGE: &str = "Failed to generate resume. Please try again.";

/// Application-level error type.
///
/// Every stage returns its own tagged error; `classify` is the one place
/// that decides the HTTP status and the text shown to the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] GenerationError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// A classified failure: status plus the message safe to send to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Decides status and client-facing message. Never fails.
    ///
    /// `expose_internal` controls whether `Internal` errors show their own
    /// message (development) or a generic one (production).
    pub fn classify(&self, expose_internal: bool) -> ApiError {
        let (status, message) = match self {
            AppError::Input(e) => {
                tracing::warn!("Validation failed: {e}");
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Upstream(GenerationError::Configuration(msg)) => {
                tracing::error!("API key error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    CONFIGURATION_MESSAGE.to_string(),
                )
            }
            AppError::Upstream(GenerationError::InvalidRequest(msg)) => {
                tracing::error!("Invalid API request: {msg}");
                (StatusCode::BAD_REQUEST, INVALID_FORMAT_MESSAGE.to_string())
            }
            AppError::Upstream(GenerationError::RateLimited(msg)) => {
                tracing::error!("Rate limited: {msg}");
                (StatusCode::TOO_MANY_REQUESTS, THROTTLED_MESSAGE.to_string())
            }
            AppError::Upstream(e) => {
                tracing::error!("Resume generation error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, own_message(e))
            }
            AppError::Extraction(e) => {
                if let ExtractionError::MalformedJson { message, cleaned } = e {
                    tracing::error!("JSON parse error: {message}\nRaw output: {cleaned}");
                } else {
                    tracing::error!("Extraction error: {e}");
                }
                (StatusCode::INTERNAL_SERVER_ERROR, own_message(e))
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, own_message(e))
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                let message = if expose_internal {
                    own_message(e)
                } else {
                    GENERIC_MESSAGE.to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        ApiError { status, message }
    }
}

fn own_message(e: &impl std::fmt::Display) -> String {
    let message = e.to_string();
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

/// Without access to the environment flag, internal detail stays hidden.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.classify(false).into_response()
    }
}
