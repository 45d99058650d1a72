//! Canned `TextGenerator` for tests that must not touch the network.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{GenerationError, TextGenerator};

type Reply = Box<dyn Fn() -> Result<String, GenerationError> + Send + Sync>;

/// Returns the same reply on every call and records the prompts it was given.
pub struct StubGenerator {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::with(move || Ok(text.clone()))
    }

    pub fn failing(make_error: impl Fn() -> GenerationError + Send + Sync + 'static) -> Self {
        Self::with(move || Err(make_error()))
    }

    fn with(reply: impl Fn() -> Result<String, GenerationError> + Send + Sync + 'static) -> Self {
        Self {
            reply: Box::new(reply),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.reply)()
    }
}
