//! Resume generation: orchestrates the full generation pipeline.
//!
//! Flow: validate request shape → sanitize prompt → validate prompt →
//!       compose → LLM generate → extract → reply with elapsed time.
//!
//! Any failure short-circuits the remaining steps and is classified once by
//! `AppError::classify`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{ApiError, AppError};
use crate::generation::extract::extract;
use crate::generation::prompts::RESUME_PROMPT_TEMPLATE;
use crate::generation::validation::{
    sanitize, validate_prompt_text, validate_request_body, PROMPT_FIELD,
};
use crate::llm_client::TextGenerator;
use crate::models::ResumeRecord;

const SUCCESS_MESSAGE: &str = "Resume generated successfully";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Success body of `POST /api/generate-resume`.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedResume {
    pub success: bool,
    pub data: ResumeRecord,
    pub message: String,
    #[serde(rename = "processingTime")]
    pub processing_time: String,
}

/// Outcome of one generation request, ready to be sent as HTTP.
#[derive(Debug)]
pub enum GenerationReply {
    Generated(GeneratedResume),
    Failed(ApiError),
}

impl GenerationReply {
    pub fn status(&self) -> StatusCode {
        match self {
            GenerationReply::Generated(_) => StatusCode::OK,
            GenerationReply::Failed(e) => e.status,
        }
    }
}

impl IntoResponse for GenerationReply {
    fn into_response(self) -> Response {
        match self {
            GenerationReply::Generated(body) => (StatusCode::OK, Json(body)).into_response(),
            GenerationReply::Failed(e) => e.into_response(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs validation, composition, generation and extraction for one request.
#[derive(Clone)]
pub struct ResumeGenerator {
    llm: Arc<dyn TextGenerator>,
}

impl ResumeGenerator {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// Handles one request body and always produces a well-formed reply.
    pub async fn handle(&self, body: &Value) -> GenerationReply {
        let started = Instant::now();
        info!("new resume generation request");

        match self.run(body).await {
            Ok(data) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                info!(duration_ms, "resume generated");
                GenerationReply::Generated(GeneratedResume {
                    success: true,
                    data,
                    message: SUCCESS_MESSAGE.to_string(),
                    processing_time: format!("{duration_ms}ms"),
                })
            }
            Err(e) => {
                let duration_ms = started.elapsed().as_millis() as u64;
                // No stage of this pipeline yields `AppError::Internal`.
                let classified = e.classify(false);
                warn!(
                    duration_ms,
                    status = classified.status.as_u16(),
                    "resume generation failed"
                );
                GenerationReply::Failed(classified)
            }
        }
    }

    async fn run(&self, body: &Value) -> Result<ResumeRecord, AppError> {
        validate_request_body(body)?;

        // Anything that is not text sanitizes to "".
        let prompt = match &body[PROMPT_FIELD] {
            Value::String(raw) => sanitize(raw),
            _ => String::new(),
        };
        info!(prompt_chars = prompt.chars().count(), "received prompt");

        validate_prompt_text(&prompt)?;
        info!("input validation passed");

        let composed = build_resume_prompt(&prompt);

        info!("calling generation service");
        let raw = self.llm.generate(&composed).await?;

        let record = extract(&raw)?;
        info!("resume data extracted");

        Ok(record)
    }
}

/// Embeds the sanitized user text into the fixed instruction template.
pub fn build_resume_prompt(sanitized_prompt: &str) -> String {
    RESUME_PROMPT_TEMPLATE.replace("{user_input}", sanitized_prompt)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
