// Resume generation pipeline: validation, prompt composition, model call,
// JSON extraction, and the HTTP handlers that expose it.
// All model calls go through llm_client; nothing here talks to Gemini directly.

pub mod extract;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod validation;
