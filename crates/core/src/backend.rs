//! Backend trait — the abstraction over the reasoning backend.
//!
//! A Backend takes a fully constructed instruction text and returns raw
//! generated text. Prompt construction and output parsing both belong to
//! the engine in `sidekick-brain`; the backend itself is opaque
//! (llama.cpp server, Ollama, any OpenAI-compatible endpoint, or a mock
//! in tests).

use async_trait::async_trait;
use crate::error::BackendError;

/// A single completion request.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// The full instruction text, already assembled.
    pub prompt: String,

    /// Hard cap on generated tokens.
    pub max_tokens: u32,

    /// Sampling temperature (0.0 = deterministic).
    pub temperature: f32,

    /// Sequences that end generation.
    pub stop: Vec<String>,
}

impl BackendRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: 512,
            temperature: 0.7,
            stop: Vec::new(),
        }
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = stop;
        self
    }
}

/// The reasoning backend boundary.
#[async_trait]
pub trait Backend: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai-compat").
    fn name(&self) -> &str;

    /// Run one completion and return the raw generated text.
    async fn complete(&self, request: BackendRequest)
    -> std::result::Result<String, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_defaults() {
        let req = BackendRequest::new("hello")
            .with_max_tokens(128)
            .with_temperature(0.2)
            .with_stop(vec!["User:".into()]);
        assert_eq!(req.max_tokens, 128);
        assert!((req.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(req.stop, vec!["User:".to_string()]);
    }
}
