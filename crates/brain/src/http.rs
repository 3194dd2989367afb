//! OpenAI-compatible HTTP backend.
//!
//! Speaks the `/v1/completions` text-completion shape, which llama.cpp
//! server, Ollama, vLLM, and most local inference servers expose. The
//! engine hands over a fully built prompt; this backend only moves bytes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sidekick_core::backend::{Backend, BackendRequest};
use sidekick_core::error::BackendError;
use tracing::{debug, trace};

/// A backend speaking the OpenAI-compatible completions API.
pub struct HttpBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpBackend {
    /// `base_url` is the server root (e.g. `http://127.0.0.1:8080`);
    /// `model` may be empty when the server serves a single model.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BackendError::NotConfigured(format!("HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    #[serde(skip_serializing_if = "str::is_empty")]
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
    stream: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    text: String,
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &str {
        "openai-compat"
    }

    async fn complete(&self, request: BackendRequest) -> Result<String, BackendError> {
        let url = format!("{}/v1/completions", self.base_url);
        let body = ApiRequest {
            model: &self.model,
            prompt: &request.prompt,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop: request.stop,
            stream: false,
        };
        trace!(prompt_len = request.prompt.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(self.timeout_secs)
                } else {
                    BackendError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status_code: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Network(format!("malformed response body: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(BackendError::EmptyCompletion);
        }
        debug!(chars = text.len(), "Completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_skips_empty_model_and_stop() {
        let body = ApiRequest {
            model: "",
            prompt: "hi",
            max_tokens: 16,
            temperature: 0.2,
            stop: vec![],
            stream: false,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("model"));
        assert!(!json.contains("stop"));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let backend = HttpBackend::new("http://localhost:8080/", "", 30).unwrap();
        assert_eq!(backend.base_url, "http://localhost:8080");
    }
}
