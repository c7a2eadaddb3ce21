//! OpenAI Provider
//!
//! Implementation of the LlmProvider trait for OpenAI's chat-completions
//! API. Also works against OpenAI-compatible gateways via `base_url`.

use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::build_http_client;
use super::provider::{missing_api_key_error, parse_http_error, LlmProvider};
use super::types::{LlmError, LlmResult, ProviderConfig};

/// Default OpenAI API endpoint
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Endpoint used by the health probe
const OPENAI_MODELS_URL: &str = "https://api.openai.com/v1/models";

/// OpenAI provider
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: Option<OpenAIErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: Option<String>,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = build_http_client(None);
        Self { config, client }
    }

    /// Get the API base URL
    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(OPENAI_API_URL)
    }

    /// Build the request body for the API
    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [{
                "role": "user",
                "content": prompt,
            }],
        })
    }

    /// Map a reqwest transport error to `LlmError`.
    fn map_reqwest_error(&self, err: reqwest::Error) -> LlmError {
        let msg = err.to_string();
        if err.is_connect() {
            LlmError::ProviderUnavailable {
                message: format!("cannot connect to {}: {}", self.base_url(), msg),
            }
        } else {
            LlmError::NetworkError { message: msg }
        }
    }

    /// Map an HTTP error response to `LlmError`, preferring the structured
    /// error message when the body carries one.
    fn map_http_error(&self, status: u16, body_text: &str, retry_after: Option<u32>) -> LlmError {
        let detail = serde_json::from_str::<OpenAIErrorResponse>(body_text)
            .ok()
            .and_then(|r| r.error);
        let message = detail
            .as_ref()
            .and_then(|d| d.message.as_deref())
            .unwrap_or(body_text);
        parse_http_error(status, message, "openai", retry_after)
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn generate_text(&self, prompt: &str) -> LlmResult<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| missing_api_key_error("openai"))?;

        let body = self.build_request_body(prompt);

        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "openai request");

        let response = self
            .client
            .post(self.base_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status().as_u16();
        let retry_after = retry_after_header(&response);
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if status != 200 {
            return Err(self.map_http_error(status, &body_text, retry_after));
        }

        let completion: ChatCompletionResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        tracing::debug!(response_len = text.len(), "openai response");
        Ok(text)
    }

    async fn is_healthy(&self) -> bool {
        let Some(api_key) = self.config.api_key.as_ref() else {
            return false;
        };
        // The chat endpoint may be a gateway override; the models listing
        // is the cheapest authenticated probe against the same host.
        let url = if self.config.base_url.is_some() {
            self.base_url().to_string()
        } else {
            OPENAI_MODELS_URL.to_string()
        };
        match self.client.get(url).bearer_auth(api_key).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                // A 405 from a completions URL still proves reachability + auth
                status < 500 && status != 401 && status != 403
            }
            Err(_) => false,
        }
    }
}

/// Read a `retry-after` header as whole seconds, if present.
pub(crate) fn retry_after_header(response: &reqwest::Response) -> Option<u32> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u32>().ok())
}
