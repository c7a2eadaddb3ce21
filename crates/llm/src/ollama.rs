//! Ollama Provider
//!
//! Implementation of the LlmProvider trait for Ollama local inference
//! using the ollama-rs native SDK. Runs without API keys against a local
//! or LAN inference server.

use async_trait::async_trait;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::models::ModelOptions;
use ollama_rs::Ollama;

use super::provider::LlmProvider;
use super::types::{LlmError, LlmResult, ProviderConfig};

/// Default Ollama API endpoint
const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Ollama provider for local inference using the native ollama-rs SDK
pub struct OllamaProvider {
    config: ProviderConfig,
    client: Ollama,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let base_url = config.base_url.as_deref().unwrap_or(OLLAMA_DEFAULT_URL);
        let client = Self::create_client(base_url);
        Self { config, client }
    }

    /// Create an Ollama SDK client from a base URL string.
    ///
    /// Parses the URL to extract host and port for `Ollama::new()`.
    /// Falls back to `Ollama::default()` if parsing fails.
    fn create_client(base_url: &str) -> Ollama {
        if let Ok(parsed) = url::Url::parse(base_url) {
            let scheme = parsed.scheme();
            let host = parsed.host_str().unwrap_or("localhost");
            let port = parsed.port().unwrap_or(11434);
            // Reconstruct the host URL without port (Ollama::new takes them separately)
            let host_url = format!("{}://{}", scheme, host);
            Ollama::new(host_url, port)
        } else {
            Ollama::default()
        }
    }

    /// Get the base URL for the Ollama server (used in error messages)
    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(OLLAMA_DEFAULT_URL)
    }

    /// Map an ollama-rs error to `LlmError`.
    fn map_ollama_error(&self, err: ollama_rs::error::OllamaError) -> LlmError {
        let msg = err.to_string();
        let lower = msg.to_lowercase();
        if lower.contains("connect") || lower.contains("connection refused") {
            LlmError::ProviderUnavailable {
                message: format!(
                    "Cannot reach Ollama at {}. Is the server running?",
                    self.base_url()
                ),
            }
        } else if lower.contains("not found") {
            LlmError::ModelNotFound {
                model: format!("{}: {}", self.config.model, msg),
            }
        } else {
            LlmError::Other { message: msg }
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn generate_text(&self, prompt: &str) -> LlmResult<String> {
        let mut options = ModelOptions::default().temperature(self.config.temperature);
        if self.config.max_tokens > 0 {
            options = options.num_predict(self.config.max_tokens as i32);
        }

        let request =
            GenerationRequest::new(self.config.model.clone(), prompt.to_string()).options(options);

        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "ollama request");

        let response = self
            .client
            .generate(request)
            .await
            .map_err(|e| self.map_ollama_error(e))?;

        tracing::debug!(response_len = response.response.len(), "ollama response");
        Ok(response.response)
    }

    async fn is_healthy(&self) -> bool {
        self.client.list_local_models().await.is_ok()
    }
}
