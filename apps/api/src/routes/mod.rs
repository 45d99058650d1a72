pub mod health;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer};
use tracing::error;

use crate::generation::handlers;
use crate::rate_limit::rate_limit;
use crate::state::AppState;

pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

const AVAILABLE_ENDPOINTS: [&str; 5] = [
    "GET /health",
    "GET /api/health",
    "POST /api/generate-resume",
    "POST /api/download-pdf",
    "POST /api/download-docx",
];

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::health_handler))
        .route(
            "/api/generate-resume",
            post(handlers::handle_generate_resume),
        )
        .route("/api/download-pdf", post(handlers::handle_download_pdf))
        .route("/api/download-docx", post(handlers::handle_download_docx))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .with_state(state)
}

async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": format!("Route {} {} not found", method, uri.path()),
            "availableEndpoints": AVAILABLE_ENDPOINTS,
        })),
    )
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(detail, "panic while handling request");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": "Internal server error",
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::{Config, Environment};
    use crate::generation::generator::ResumeGenerator;
    use crate::llm_client::stub::StubGenerator;
    use crate::llm_client::GenerationError;
    use crate::rate_limit::{RateLimiter, WINDOW};

    const CAREER: &str =
        "Jane Doe, backend engineer at Acme since 2019. Built payment services in Go and Rust.";

    fn test_config() -> Config {
        Config {
            gemini_api_key: "test-key".into(),
            gemini_api_base: "http://127.0.0.1:9".into(),
            generation_timeout: Some(Duration::from_secs(5)),
            environment: Environment::Development,
            port: 0,
            rust_log: "info".into(),
        }
    }

    fn state_with(stub: StubGenerator) -> AppState {
        let generator = ResumeGenerator::new(Arc::new(stub));
        AppState::new(test_config(), generator)
    }

    fn app(stub: StubGenerator) -> Router {
        build_router(state_with(stub))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_generate_resume_success() {
        let stub = StubGenerator::text(
            "Here you go:\n```json\n{\"name\":\"Jane Doe\",\"skills\":[\"Go\",\"Rust\"]}\n```",
        );
        let body = json!({ "prompt": CAREER }).to_string();
        let response = app(stub)
            .oneshot(post_json("/api/generate-resume", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["name"], "Jane Doe");
        assert_eq!(json["data"]["skills"][1], "Rust");
        assert_eq!(json["message"], "Resume generated successfully");
        assert!(json["processingTime"].as_str().unwrap().ends_with("ms"));
    }

    #[tokio::test]
    async fn test_generate_resume_missing_prompt() {
        let response = app(StubGenerator::text("{}"))
            .oneshot(post_json("/api/generate-resume", r#"{"text":"hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("prompt"));
    }

    #[tokio::test]
    async fn test_generate_resume_malformed_json() {
        let response = app(StubGenerator::text("{}"))
            .oneshot(post_json("/api/generate-resume", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON in request body"));
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let body = json!({ "prompt": "a".repeat(BODY_LIMIT_BYTES + 1) }).to_string();
        let response = app(StubGenerator::text("{}"))
            .oneshot(post_json("/api/generate-resume", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert!(!json["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON in request body"));
    }

    #[tokio::test]
    async fn test_missing_content_type_is_415() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/download-pdf")
            .body(Body::from(r#"{"name":"Jane Doe"}"#))
            .unwrap();
        let response = app(StubGenerator::text("{}"))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Content-Type"));
    }

    #[tokio::test]
    async fn test_upstream_rate_limit_is_429() {
        let stub = StubGenerator::failing(|| GenerationError::RateLimited("quota".into()));
        let body = json!({ "prompt": CAREER }).to_string();
        let response = app(stub)
            .oneshot(post_json("/api/generate-resume", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = json_body(response).await;
        assert_eq!(
            json["error"],
            "Too many requests. Please try again in a few moments."
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = app(StubGenerator::text("{}"))
            .oneshot(get_request("/nope"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Route GET /nope not found");
        assert!(json["availableEndpoints"]
            .as_array()
            .unwrap()
            .contains(&json!("POST /api/generate-resume")));
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(StubGenerator::text("{}"))
            .oneshot(get_request("/health"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::X_CONTENT_TYPE_OPTIONS],
            "nosniff"
        );
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
        let json = json_body(response).await;
        assert_eq!(json["environment"], "development");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert!(json["uptime"].as_f64().unwrap() >= 0.0);
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_download_pdf() {
        let body = json!({
            "name": "Jane Doe",
            "skills": ["Go"],
            "experience": [{ "company": "Acme", "role": "Engineer", "achievements": ["Shipped"] }]
        })
        .to_string();
        let response = app(StubGenerator::text("{}"))
            .oneshot(post_json("/api/download-pdf", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Jane Doe.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_download_docx_defaults_name() {
        let response = app(StubGenerator::text("{}"))
            .oneshot(post_json("/api/download-docx", r#"{"skills":["Go"]}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Resume.docx\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn test_download_rejects_non_object() {
        let response = app(StubGenerator::text("{}"))
            .oneshot(post_json("/api/download-pdf", "[1,2,3]"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Resume data must be a JSON object");
    }

    #[tokio::test]
    async fn test_rate_limit_rejects_excess_requests() {
        let mut state = state_with(StubGenerator::text("{}"));
        state.rate_limiter = Arc::new(RateLimiter::new(1, WINDOW));
        let app = build_router(state);

        let first = app.clone().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = json_body(second).await;
        assert_eq!(
            json["error"],
            "Too many requests. Please try again in 15 minutes."
        );
        assert!(json["retryAfter"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_panic_response_is_json_500() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
