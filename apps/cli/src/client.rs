//! HTTP client for the ResumeCraft API.

use bytes::Bytes;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::retry::{fetch_with_retry, RetryPolicy};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered 200 but reported `success: false`.
    #[error("{0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Pdf,
    Docx,
}

impl DownloadFormat {
    fn path(&self) -> &'static str {
        match self {
            DownloadFormat::Pdf => "/api/download-pdf",
            DownloadFormat::Docx => "/api/download-docx",
        }
    }
}

/// Success body of `POST /api/generate-resume`.
#[derive(Debug, Deserialize)]
pub struct Generated {
    pub data: Value,
    #[serde(rename = "processingTime")]
    pub processing_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    error: Option<String>,
    #[serde(flatten)]
    rest: Value,
}

#[derive(Clone)]
pub struct ResumeClient {
    http: Client,
    base_url: String,
}

impl ResumeClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Generates a resume, retrying failed HTTP exchanges per `policy`.
    pub async fn generate(
        &self,
        prompt: &str,
        policy: &RetryPolicy,
    ) -> Result<Generated, ClientError> {
        info!(prompt_chars = prompt.chars().count(), "requesting resume generation");

        let envelope: Envelope =
            fetch_with_retry(move || self.post_generate(prompt), policy).await?;

        if !envelope.success {
            return Err(ClientError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "Failed to generate resume".to_string()),
            ));
        }

        let generated: Generated = serde_json::from_value(envelope.rest).map_err(|e| {
            ClientError::Rejected(format!("unexpected response shape: {e}"))
        })?;
        debug!(processing_time = ?generated.processing_time, "resume generated");
        Ok(generated)
    }

    async fn post_generate(&self, prompt: &str) -> Result<Envelope, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/generate-resume", self.base_url))
            .json(&json!({ "prompt": prompt }))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    /// Renders `record` on the server and returns the document bytes.
    pub async fn download(
        &self,
        record: &Value,
        format: DownloadFormat,
    ) -> Result<Bytes, ClientError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, format.path()))
            .json(record)
            .send()
            .await?;
        Ok(ensure_success(response).await?.bytes().await?)
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }
}

/// Turns a non-success status into `ClientError::Status`, preferring the
/// server's `error` field over the raw body.
async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(body);

    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}
