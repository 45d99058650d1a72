//! LLM client: the single point of entry for all Gemini API calls in ResumeCraft.
//!
//! ARCHITECTURAL RULE: No other module may call the generation service directly.
//! All model interactions go through a `TextGenerator`; `GeminiClient` is the
//! production implementation.
//!
//! Model: gemini-2.5-pro, hardcoded.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// The model used for every generation call.
pub const MODEL: &str = "gemini-2.5-pro";

#[cfg(test)]
pub mod stub;

/// Locations probed for output text, in order. The response envelope has
/// drifted between API versions; the first non-empty match wins.
const TEXT_PROBES: [&str; 3] = [
    "/output_text",
    "/candidates/0/content/parts/0/text",
    "/response/candidates/0/content/parts/0/text",
];

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid prompt: must be a non-empty string")]
    EmptyPrompt,

    /// Credential missing, invalid or lacking permission.
    #[error("Generation service rejected the API key: {0}")]
    Configuration(String),

    #[error("Rate limit exceeded on generation service: {0}")]
    RateLimited(String),

    #[error("Generation service reported an invalid request: {0}")]
    InvalidRequest(String),

    #[error("Generation service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Generation service did not respond in time")]
    Timeout,

    #[error("HTTP error: {0}")]
    Transport(reqwest::Error),

    #[error("Unreadable response from generation service: {0}")]
    MalformedEnvelope(String),

    #[error("Gemini returned no readable text output.")]
    EmptyGeneration,
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Transport(e)
        }
    }
}

/// Anything that turns a composed prompt into raw model text.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>` so the pipeline can run
/// against a stub in tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    /// Builds a client. `timeout` of `None` waits on the upstream indefinitely.
    pub fn new(
        api_key: String,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                base_url.trim_end_matches('/'),
                MODEL
            ),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }

        info!(model = MODEL, prompt_chars = prompt.len(), "sending prompt to Gemini");

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%status, "Gemini API returned an error");
            return Err(classify_failure(status, &body));
        }

        let envelope: Value = serde_json::from_str(&body)
            .map_err(|e| GenerationError::MalformedEnvelope(e.to_string()))?;

        match probe_text(&envelope) {
            Some(text) => {
                debug!(output_chars = text.len(), "Gemini returned text");
                Ok(text.to_string())
            }
            None => {
                error!(response = %envelope, "Gemini returned empty text");
                Err(GenerationError::EmptyGeneration)
            }
        }
    }
}

/// Finds the first non-empty output text in a response envelope.
pub fn probe_text(envelope: &Value) -> Option<&str> {
    TEXT_PROBES
        .iter()
        .filter_map(|pointer| envelope.pointer(pointer))
        .filter_map(Value::as_str)
        .find(|text| !text.trim().is_empty())
}

/// Maps a non-success upstream response onto a tagged error.
fn classify_failure(status: StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<GeminiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            GenerationError::Configuration(message)
        }
        _ if message.contains("API key") => GenerationError::Configuration(message),
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited(message),
        StatusCode::BAD_REQUEST => GenerationError::InvalidRequest(message),
        _ => GenerationError::Service {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-pro:generateContent";

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key".into(), &server.uri(), Some(Duration::from_secs(5))).unwrap()
    }

    async fn mount(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[test]
    fn test_probe_prefers_top_level_text() {
        let envelope = json!({
            "output_text": "top",
            "candidates": [{"content": {"parts": [{"text": "nested"}]}}]
        });
        assert_eq!(probe_text(&envelope), Some("top"));
    }

    #[test]
    fn test_probe_skips_blank_matches() {
        let envelope = json!({
            "output_text": "   ",
            "candidates": [{"content": {"parts": [{"text": "nested"}]}}]
        });
        assert_eq!(probe_text(&envelope), Some("nested"));
    }

    #[test]
    fn test_probe_falls_back_to_wrapped_response() {
        let envelope = json!({
            "response": {"candidates": [{"content": {"parts": [{"text": "wrapped"}]}}]}
        });
        assert_eq!(probe_text(&envelope), Some("wrapped"));
    }

    #[test]
    fn test_probe_none_when_no_text() {
        assert_eq!(probe_text(&json!({"candidates": []})), None);
        assert_eq!(probe_text(&json!({"output_text": 7})), None);
    }

    #[test]
    fn test_classify_failure() {
        let key_body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, key_body),
            GenerationError::Configuration(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, "denied"),
            GenerationError::Configuration(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, "quota"),
            GenerationError::RateLimited(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, r#"{"error":{"message":"bad field"}}"#),
            GenerationError::InvalidRequest(m) if m == "bad field"
        ));
        assert!(matches!(
            classify_failure(StatusCode::SERVICE_UNAVAILABLE, "overloaded"),
            GenerationError::Service { status: 503, .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_prompt_never_hits_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server).generate("  ").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyPrompt));
    }

    #[tokio::test]
    async fn test_generate_sends_key_and_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "{\"name\":\"A\"}"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server).generate("hello").await.unwrap();
        assert_eq!(text, "{\"name\":\"A\"}");
    }

    #[tokio::test]
    async fn test_generate_empty_candidates() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"candidates": []})),
        )
        .await;

        let err = client_for(&server).generate("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyGeneration));
    }

    #[tokio::test]
    async fn test_generate_rate_limited() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "message": "Resource has been exhausted"}
            })),
        )
        .await;

        let err = client_for(&server).generate("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_generate_unauthorized() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(401).set_body_string("nope")).await;

        let err = client_for(&server).generate("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_generate_non_json_envelope() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_string("<html>")).await;

        let err = client_for(&server).generate("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::MalformedEnvelope(_)));
    }

    #[tokio::test]
    async fn test_generate_times_out() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"output_text": "late"}))
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let client =
            GeminiClient::new("k".into(), &server.uri(), Some(Duration::from_millis(50))).unwrap();
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout));
    }
}
