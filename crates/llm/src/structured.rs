//! Structured-Output Mediator
//!
//! Wraps a raw provider call with schema-aware prompt augmentation,
//! response cleaning, JSON parsing, schema validation, and bounded retry.
//! This is the single entry point used by every AI-assisted feature;
//! features differ only in their prompt template and target schema.
//!
//! The model channel is adversarial: responses arrive wrapped in prose or
//! markdown fences, truncated, empty, or rate-limited. The mediator's job
//! is to either deliver a value that validates against the declared schema
//! or fail with the last observed cause after a bounded number of attempts.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use super::provider::LlmProvider;
use super::retry::{BackoffPolicy, NextStep, RetryState};
use super::schema::OutputSchema;
use super::types::LlmError;

/// Tunables for one mediated call. Nothing here is hard-coded into the
/// algorithm; callers override per invocation.
#[derive(Debug, Clone)]
pub struct MediatorOptions {
    /// General attempt budget for quality failures (parse/shape/empty/timeout).
    pub max_attempts: u32,
    /// Separate budget for provider-reported rate limits.
    pub max_rate_limit_retries: u32,
    /// Base delay between quality attempts.
    pub attempt_base_delay: Duration,
    /// Base delay of the rate-limit backoff schedule.
    pub rate_limit_base_delay: Duration,
    /// Cap on any single backoff delay.
    pub max_delay: Duration,
    /// Jitter fraction applied to every delay.
    pub jitter: f64,
    /// Deadline for each individual provider call. A timeout counts as an
    /// attempt failure, never a hang.
    pub request_timeout: Option<Duration>,
}

impl Default for MediatorOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            max_rate_limit_retries: 5,
            attempt_base_delay: Duration::from_millis(500),
            rate_limit_base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            jitter: 0.2,
            request_timeout: None,
        }
    }
}

impl MediatorOptions {
    fn retry_state(&self) -> RetryState {
        RetryState::new(
            self.max_attempts,
            self.max_rate_limit_retries,
            BackoffPolicy {
                base: self.attempt_base_delay,
                cap: self.max_delay,
                jitter: self.jitter,
            },
            BackoffPolicy {
                base: self.rate_limit_base_delay,
                cap: self.max_delay,
                jitter: self.jitter,
            },
        )
    }
}

/// Why a single attempt failed to produce a schema-conformant value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptError {
    /// The cleaned response was not parseable JSON.
    Parse { message: String },
    /// The parsed value did not match the target schema.
    SchemaMismatch { message: String },
    /// The provider returned nothing usable.
    EmptyResponse,
    /// The provider call exceeded the per-call deadline.
    Timeout { after: Duration },
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Parse { message } => write!(f, "response is not valid JSON: {}", message),
            AttemptError::SchemaMismatch { message } => {
                write!(f, "response does not match schema: {}", message)
            }
            AttemptError::EmptyResponse => write!(f, "provider returned an empty response"),
            AttemptError::Timeout { after } => {
                write!(f, "provider call timed out after {:.1}s", after.as_secs_f64())
            }
        }
    }
}

/// Terminal outcome of a mediated call.
#[derive(Debug, Clone, Error)]
pub enum MediatorError {
    /// A non-retryable transport error from the provider. Propagated
    /// immediately - burning the attempt budget on a broken backend helps
    /// nobody.
    #[error("provider error: {0}")]
    Provider(LlmError),

    /// The general attempt budget ran out; carries the last quality failure.
    #[error("exhausted {attempts} attempt(s); last error: {last}")]
    Exhausted { attempts: u32, last: AttemptError },

    /// The rate-limit retry budget ran out; carries the last provider error.
    #[error("gave up after {retries} rate-limit wait(s); last error: {last}")]
    RateLimitExhausted { retries: u32, last: LlmError },
}

/// How one attempt resolved, before retry bookkeeping.
enum AttemptOutcome {
    Quality(AttemptError),
    RateLimited(LlmError),
    Fatal(LlmError),
}

/// Clean a raw model response down to the JSON payload.
///
/// Strips leading/trailing code-fence markers, then discards any prefix
/// before the first `{` and any suffix after the last `}`. This recovers
/// JSON embedded in conversational wrapper text without requiring the
/// model to be perfectly obedient.
pub fn clean_response(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(stripped) = text.strip_prefix("```") {
        text = stripped.strip_prefix("json").unwrap_or(stripped).trim_start();
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped.trim_end();
    }

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if end > start => text[start..=end].to_string(),
        _ => text.to_string(),
    }
}

/// Generate a value conforming to `schema` from the given provider.
///
/// Attempts within one call are strictly sequential, and the first
/// validated value is returned immediately - a structured result is never
/// produced twice.
pub async fn generate_structured(
    provider: &dyn LlmProvider,
    prompt: &str,
    schema: &OutputSchema,
    options: &MediatorOptions,
) -> Result<Value, MediatorError> {
    let full_prompt = format!("{}\n\n{}", prompt, schema.format_instructions());
    let mut state = options.retry_state();

    loop {
        tracing::debug!(
            schema = %schema.name,
            provider = provider.name(),
            attempt = state.attempts() + 1,
            "structured generation attempt"
        );

        let failure = match run_attempt(provider, &full_prompt, schema, options).await {
            Ok(value) => return Ok(value),
            Err(outcome) => outcome,
        };

        match failure {
            AttemptOutcome::Fatal(err) => {
                tracing::warn!(schema = %schema.name, error = %err, "provider error, not retrying");
                return Err(MediatorError::Provider(err));
            }
            AttemptOutcome::RateLimited(err) => match state.record_rate_limit(err.retry_after_secs())
            {
                NextStep::RetryAfter(delay) => {
                    tracing::warn!(
                        schema = %schema.name,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                NextStep::GiveUp => {
                    return Err(MediatorError::RateLimitExhausted {
                        retries: state.rate_limit_retries(),
                        last: err,
                    });
                }
            },
            AttemptOutcome::Quality(attempt_error) => match state.record_attempt_failure() {
                NextStep::RetryAfter(delay) => {
                    tracing::warn!(
                        schema = %schema.name,
                        error = %attempt_error,
                        delay_ms = delay.as_millis() as u64,
                        "attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                NextStep::GiveUp => {
                    return Err(MediatorError::Exhausted {
                        attempts: state.attempts(),
                        last: attempt_error,
                    });
                }
            },
        }
    }
}

/// One attempt: call, clean, parse, validate.
async fn run_attempt(
    provider: &dyn LlmProvider,
    full_prompt: &str,
    schema: &OutputSchema,
    options: &MediatorOptions,
) -> Result<Value, AttemptOutcome> {
    let call = provider.generate_text(full_prompt);
    let response = match options.request_timeout {
        Some(deadline) => match tokio::time::timeout(deadline, call).await {
            Ok(result) => result,
            Err(_) => {
                return Err(AttemptOutcome::Quality(AttemptError::Timeout {
                    after: deadline,
                }))
            }
        },
        None => call.await,
    };

    let text = match response {
        Ok(text) => text,
        Err(err) if err.is_rate_limited() => return Err(AttemptOutcome::RateLimited(err)),
        Err(err) => return Err(AttemptOutcome::Fatal(err)),
    };

    let cleaned = clean_response(&text);
    if cleaned.is_empty() {
        return Err(AttemptOutcome::Quality(AttemptError::EmptyResponse));
    }

    let parsed: Value = serde_json::from_str(&cleaned).map_err(|e| {
        AttemptOutcome::Quality(AttemptError::Parse {
            message: e.to_string(),
        })
    })?;

    schema
        .validate_value(&parsed)
        .map_err(|message| AttemptOutcome::Quality(AttemptError::SchemaMismatch { message }))?;

    Ok(parsed)
}
