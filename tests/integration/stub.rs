//! Scripted provider stub shared by the integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use data_loom::{LlmError, LlmProvider, ProviderConfig};

/// One scripted provider behavior per call, consumed front to back.
pub enum Script {
    Reply(String),
    Fail(LlmError),
}

/// An `LlmProvider` that plays back a fixed script and counts calls.
pub struct ScriptedProvider {
    config: ProviderConfig,
    script: Mutex<VecDeque<Script>>,
    calls: AtomicU32,
    healthy: bool,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Script>) -> Self {
        Self {
            config: ProviderConfig::default(),
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
            healthy: true,
        }
    }

    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn rate_limited() -> LlmError {
        LlmError::RateLimited {
            message: "429 from stub".to_string(),
            retry_after: None,
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "stub"
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn generate_text(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(Script::Reply(text)) => Ok(text),
            Some(Script::Fail(err)) => Err(err),
            None => Ok(String::new()),
        }
    }

    async fn is_healthy(&self) -> bool {
        self.healthy
    }
}
