//! Axum route handlers for the Generation and Download API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::{ApiError, AppError};
use crate::generation::generator::GenerationReply;
use crate::generation::validation::ValidationError;
use crate::models::ResumeRecord;
use crate::render::{render, DocumentFormat, RenderError};
use crate::state::AppState;

const NOT_AN_OBJECT_MESSAGE: &str = "Resume data must be a JSON object";

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate-resume
///
/// Body `{ "prompt": string }`. Replies with the structured resume or a
/// classified `{ success: false, error }` body; never panics on bad input.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> GenerationReply {
    match payload {
        Ok(Json(body)) => state.generator.handle(&body).await,
        Err(rejection) => {
            let status = rejection_status(&rejection);
            warn!(status = status.as_u16(), "unreadable request body");
            let failure = if status == StatusCode::BAD_REQUEST {
                AppError::from(ValidationError::MalformedBody(rejection.body_text()))
                    .classify(false)
            } else {
                ApiError {
                    status,
                    message: rejection.body_text(),
                }
            };
            GenerationReply::Failed(failure)
        }
    }
}

/// POST /api/download-pdf
pub async fn handle_download_pdf(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    download(&state, payload, DocumentFormat::Pdf).await
}

/// POST /api/download-docx
pub async fn handle_download_docx(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    download(&state, payload, DocumentFormat::Docx).await
}

/// Unparseable JSON is the client's fault (400); size and content-type
/// rejections keep their own status.
fn rejection_status(rejection: &JsonRejection) -> StatusCode {
    match rejection {
        JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
            StatusCode::BAD_REQUEST
        }
        other => other.status(),
    }
}

// Download failures are plain text, not the JSON envelope used by generation.
async fn download(
    state: &AppState,
    payload: Result<Json<Value>, JsonRejection>,
    format: DocumentFormat,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            let status = rejection_status(&rejection);
            warn!(status = status.as_u16(), "unreadable download body");
            return (status, rejection.body_text()).into_response();
        }
    };

    let Some(record) = ResumeRecord::from_value(&body) else {
        return (StatusCode::BAD_REQUEST, NOT_AN_OBJECT_MESSAGE).into_response();
    };

    let filename = attachment_filename(record.display_name(), format);
    match run_blocking(move || render(&record, format)).await {
        Ok(bytes) => {
            info!(
                format = format.extension(),
                size_bytes = bytes.len(),
                "document rendered"
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, format.content_type().to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{filename}\""),
                    ),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            let failure = e.classify(state.expose_internal());
            (failure.status, failure.message).into_response()
        }
    }
}

/// Runs a renderer on the blocking pool. A renderer that panics surfaces
/// as `AppError::Internal`.
async fn run_blocking<T, F>(job: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, RenderError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(result) => Ok(result?),
        Err(join_error) => Err(AppError::Internal(anyhow::Error::new(join_error))),
    }
}

/// `<name>.<ext>` with anything that cannot sit inside a quoted header value
/// replaced by '_'.
fn attachment_filename(name: &str, format: DocumentFormat) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() => c,
            ' ' | '-' | '_' | '.' => c,
            _ => '_',
        })
        .collect();
    let stem = if stem.trim().is_empty() { "Resume" } else { stem.as_str() };
    format!("{stem}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_filename() {
        assert_eq!(
            attachment_filename("Jane Doe", DocumentFormat::Pdf),
            "Jane Doe.pdf"
        );
        assert_eq!(
            attachment_filename("José \"JJ\" Núñez", DocumentFormat::Docx),
            "Jos_ _JJ_ N__ez.docx"
        );
        assert_eq!(attachment_filename("  ", DocumentFormat::Pdf), "Resume.pdf");
    }

    #[tokio::test]
    async fn test_render_job_result_passes_through() {
        let bytes = run_blocking(|| Ok::<_, RenderError>(vec![1u8, 2, 3])).await.unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);

        let err = run_blocking(|| Err::<Vec<u8>, _>(RenderError::Pdf("no fonts".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
        assert_eq!(err.classify(false).message, "Failed to generate PDF: no fonts");
    }

    #[tokio::test]
    async fn test_crashed_render_job_is_internal() {
        let err = run_blocking(|| -> Result<Vec<u8>, RenderError> { panic!("layout overflow") })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        let hidden = err.classify(false);
        assert_eq!(hidden.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!hidden.message.contains("panicked"));

        let shown = err.classify(true);
        assert_eq!(shown.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(shown.message.contains("panicked"), "{}", shown.message);
    }
}
