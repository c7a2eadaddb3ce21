//! Data Loom LLM
//!
//! Provides a unified interface for generating schema-conformant structured
//! output from multiple LLM providers:
//! - Ollama (local inference)
//! - OpenAI (chat completions)
//! - Anthropic Claude (messages)
//!
//! The provider layer stays deliberately thin - a single "generate text for
//! prompt" operation plus a health probe. All retry, response cleaning, and
//! schema enforcement lives in the structured-output mediator, so provider
//! failures keep their original diagnostics.

pub mod anthropic;
pub mod factory;
pub mod http_client;
pub mod ollama;
pub mod openai;
pub mod provider;
pub mod retry;
pub mod schema;
pub mod structured;
pub mod types;

// Re-export main types
pub use anthropic::AnthropicProvider;
pub use factory::create_provider;
pub use http_client::build_http_client;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use retry::{BackoffPolicy, NextStep, RetryState};
pub use schema::{FieldSpec, OutputSchema, SchemaKind};
pub use structured::{
    clean_response, generate_structured, AttemptError, MediatorError, MediatorOptions,
};
pub use types::*;
