//! Application Configuration
//!
//! The externally-supplied configuration surface: provider selection,
//! per-provider endpoint/model identifiers, and the sampling temperature.
//! Nothing here is hard-coded into mediator logic - callers load a config,
//! possibly override it per request, and hand it to the api layer.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use data_loom_core::{CoreError, CoreResult};
use data_loom_llm::{MediatorOptions, ProviderConfig, ProviderType};

/// Top-level configuration for the mediation side of the system.
///
/// The validation engine needs no configuration at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which backend to use.
    #[serde(default = "default_provider")]
    pub provider: ProviderType,
    /// Model override; each backend has a sensible default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Endpoint override (e.g. a LAN Ollama host or an API gateway).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// API key. Usually left unset here and supplied via environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Sampling temperature; structured extraction wants it low.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Per-provider-call deadline in seconds. Unset means no deadline
    /// beyond the transport defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_provider() -> ProviderType {
    ProviderType::Ollama
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// The API key: explicit config wins, then the provider's conventional
    /// environment variable. Ollama needs none.
    pub fn resolve_api_key(&self) -> Option<String> {
        if self.api_key.is_some() {
            return self.api_key.clone();
        }
        let var = match self.provider {
            ProviderType::Ollama => return None,
            ProviderType::OpenAI => "OPENAI_API_KEY",
            ProviderType::Anthropic => "ANTHROPIC_API_KEY",
        };
        std::env::var(var).ok().filter(|key| !key.is_empty())
    }

    /// Materialize the provider configuration for one mediator invocation.
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider,
            api_key: self.resolve_api_key(),
            base_url: self.base_url.clone(),
            model: self
                .model
                .clone()
                .unwrap_or_else(|| self.provider.default_model().to_string()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            options: Default::default(),
        }
    }

    /// Mediator options derived from this configuration.
    pub fn mediator_options(&self) -> MediatorOptions {
        MediatorOptions {
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            ..MediatorOptions::default()
        }
    }

    /// Reject configurations that can never work before any call is made.
    pub fn check(&self) -> CoreResult<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(CoreError::config(format!(
                "temperature {} is outside [0, 2]",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(CoreError::config("max_tokens must be positive"));
        }
        Ok(())
    }
}
