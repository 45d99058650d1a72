//! Request and prompt validation for resume generation.
//!
//! Checks run in a fixed order and only the first failure is reported, so the
//! order below decides which message a given bad input receives.

use serde_json::Value;
use thiserror::Error;

pub const MIN_PROMPT_CHARS: usize = 50;
pub const MAX_PROMPT_CHARS: usize = 5000;

/// Field every generation request must carry.
pub const PROMPT_FIELD: &str = "prompt";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Request body must be an object")]
    NotAnObject,

    #[error("Request must include '{0}' field")]
    MissingField(&'static str),

    #[error("Invalid JSON in request body: {0}")]
    MalformedBody(String),

    /// `null` prompt. Reported as an empty input, with its own wording.
    #[error("Prompt cannot be null or undefined")]
    NullInput,

    #[error("Prompt must be a string")]
    NotAString,

    #[error("Prompt cannot be empty")]
    EmptyInput,

    #[error("Prompt too short. Minimum {min} characters required. Current: {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Prompt too long. Maximum {max} characters allowed. Current: {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Prompt must contain alphanumeric characters")]
    NoAlphanumeric,
}

pub type ValidationResult = Result<(), ValidationError>;

/// Escapes `& < > " '` as HTML entities, in that order.
///
/// `&` is replaced first so every occurrence is escaped exactly once per pass.
/// Text that is already escaped gets escaped again.
pub fn sanitize(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Validates the shape of a generation request body.
///
/// Only the presence of the `prompt` key is checked here; `"prompt": null`
/// passes and is rejected later as empty text.
pub fn validate_request_body(body: &Value) -> ValidationResult {
    let obj = body.as_object().ok_or(ValidationError::NotAnObject)?;
    if !obj.contains_key(PROMPT_FIELD) {
        return Err(ValidationError::MissingField(PROMPT_FIELD));
    }
    Ok(())
}

/// Validates a raw prompt value. Null and type checks precede length checks,
/// which precede the content check. The request path sanitizes first and
/// only ever hands text to [`validate_prompt_text`].
pub fn validate_prompt(prompt: &Value) -> ValidationResult {
    match prompt {
        Value::Null => Err(ValidationError::NullInput),
        Value::String(text) => validate_prompt_text(text),
        _ => Err(ValidationError::NotAString),
    }
}

/// Length and content checks on prompt text, measured after trimming.
pub fn validate_prompt_text(text: &str) -> ValidationResult {
    let trimmed = text.trim();
    let len = trimmed.chars().count();

    if len == 0 {
        return Err(ValidationError::EmptyInput);
    }
    if len < MIN_PROMPT_CHARS {
        return Err(ValidationError::TooShort {
            min: MIN_PROMPT_CHARS,
            actual: len,
        });
    }
    if len > MAX_PROMPT_CHARS {
        return Err(ValidationError::TooLong {
            max: MAX_PROMPT_CHARS,
            actual: len,
        });
    }
    if !trimmed.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::NoAlphanumeric);
    }

    Ok(())
}
