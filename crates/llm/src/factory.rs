//! Provider Factory
//!
//! Maps a `ProviderType` configuration key to the concrete provider
//! implementation. Resolution happens once per mediator invocation, never
//! cached across calls, so a misbehaving backend is isolated to the call
//! that selected it.

use std::sync::Arc;

use super::anthropic::AnthropicProvider;
use super::ollama::OllamaProvider;
use super::openai::OpenAIProvider;
use super::provider::LlmProvider;
use super::types::{ProviderConfig, ProviderType};

/// Create an LLM provider from a ProviderConfig.
pub fn create_provider(config: ProviderConfig) -> Arc<dyn LlmProvider> {
    match config.provider {
        ProviderType::Ollama => Arc::new(OllamaProvider::new(config)),
        ProviderType::OpenAI => Arc::new(OpenAIProvider::new(config)),
        ProviderType::Anthropic => Arc::new(AnthropicProvider::new(config)),
    }
}
