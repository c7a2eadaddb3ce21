//! Anthropic Claude Provider
//!
//! Implementation of the LlmProvider trait for Anthropic's messages API.

use async_trait::async_trait;
use serde::Deserialize;

use super::http_client::build_http_client;
use super::openai::retry_after_header;
use super::provider::{missing_api_key_error, parse_http_error, LlmProvider};
use super::types::{LlmError, LlmResult, ProviderConfig};

/// Default Anthropic API endpoint
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Endpoint used by the health probe
const ANTHROPIC_MODELS_URL: &str = "https://api.anthropic.com/v1/models";

/// Current API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider
pub struct AnthropicProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = build_http_client(None);
        Self { config, client }
    }

    /// Get the API base URL
    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL)
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

    /// Concatenate the text blocks of a response.
    fn extract_text(response: &ClaudeResponse) -> String {
        response
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
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
            .ok_or_else(|| missing_api_key_error("anthropic"))?;

        let body = self.build_request_body(prompt);

        tracing::debug!(model = %self.config.model, prompt_len = prompt.len(), "anthropic request");

        let response = self
            .client
            .post(self.base_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::ProviderUnavailable {
                        message: format!("cannot connect to {}: {}", ANTHROPIC_API_URL, e),
                    }
                } else {
                    LlmError::NetworkError {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status().as_u16();
        let retry_after = retry_after_header(&response);
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, "anthropic", retry_after));
        }

        let claude_response: ClaudeResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        let text = Self::extract_text(&claude_response);
        tracing::debug!(response_len = text.len(), "anthropic response");
        Ok(text)
    }

    async fn is_healthy(&self) -> bool {
        let Some(api_key) = self.config.api_key.as_ref() else {
            return false;
        };
        match self
            .client
            .get(ANTHROPIC_MODELS_URL)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProviderType;

    #[test]
    fn test_request_body_shape() {
        let mut config = ProviderConfig::for_provider(ProviderType::Anthropic);
        config.api_key = Some("sk-ant-test".to_string());
        let provider = AnthropicProvider::new(config);
        let body = provider.build_request_body("Translate this query");
        assert_eq!(body["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(body["messages"][0]["content"], "Translate this query");
    }

    #[test]
    fn test_extract_text_joins_blocks() {
        let response = ClaudeResponse {
            content: vec![
                ClaudeContentBlock {
                    block_type: "text".to_string(),
                    text: Some("{\"a\":".to_string()),
                },
                ClaudeContentBlock {
                    block_type: "text".to_string(),
                    text: Some("1}".to_string()),
                },
            ],
        };
        assert_eq!(AnthropicProvider::extract_text(&response), "{\"a\":1}");
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let config = ProviderConfig::for_provider(ProviderType::Anthropic);
        let provider = AnthropicProvider::new(config);
        let err = provider.generate_text("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::AuthenticationFailed { .. }));
        assert!(!provider.is_healthy().await);
    }
}
