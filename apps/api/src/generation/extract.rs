//! Pulls a resume record out of raw model output.
//!
//! The model is told to answer with bare JSON but regularly wraps it in code
//! fences or prose. Extraction is greedy: everything from the first `{` to the
//! last `}` is treated as the JSON body. Unbalanced braces inside string values,
//! or two separate objects in one reply, will defeat this; that is a known
//! limitation and callers get a `MalformedJson` error in those cases.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::models::ResumeRecord;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Gemini returned invalid JSON.")]
    NoJsonFound,

    #[error("Failed to parse Gemini JSON response.")]
    MalformedJson {
        message: String,
        cleaned: String,
    },

    #[error("Invalid resume data returned from API")]
    NotAnObject,
}

/// Removes every literal "```json" and "```" marker and trims the result.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Greedy brace-to-brace match: first `{` through last `}` inclusive.
pub fn find_json_body(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Extracts a [`ResumeRecord`] from raw model output.
pub fn extract(raw: &str) -> Result<ResumeRecord, ExtractionError> {
    let cleaned = strip_code_fences(raw);

    let Some(body) = find_json_body(&cleaned) else {
        error!(output = %cleaned, "model output missing JSON");
        return Err(ExtractionError::NoJsonFound);
    };

    let value: Value = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, output = %cleaned, "JSON parse error");
        ExtractionError::MalformedJson {
            message: e.to_string(),
            cleaned: cleaned.clone(),
        }
    })?;

    debug!("parsed model JSON successfully");
    ResumeRecord::from_value(&value).ok_or(ExtractionError::NotAnObject)
}
