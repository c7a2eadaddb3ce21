//! Retry State Machine
//!
//! Bounded-attempt bookkeeping for the structured-output mediator,
//! modeled as explicit state (attempt count, rate-limit retry count, next
//! delay) rather than nested control flow, so the budgets and the jittered
//! delay schedule are independently testable.
//!
//! Two budgets run side by side:
//! - quality failures (bad JSON, shape mismatch, empty response, timeout)
//!   consume the small general attempt budget;
//! - provider-reported rate limits consume their own larger budget and do
//!   NOT touch the general one, since they say nothing about response
//!   quality.

use std::time::Duration;

use rand::Rng;

/// Geometric backoff schedule with jitter.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub base: Duration,
    /// Upper bound on any single delay (pre-jitter).
    pub cap: Duration,
    /// Jitter fraction; 0.2 means the delay is scaled by [0.8, 1.2].
    pub jitter: f64,
}

impl BackoffPolicy {
    /// The un-jittered delay for retry number `retry` (0-based):
    /// `base * 2^retry`, capped.
    pub fn raw_delay(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        let delay = self.base.saturating_mul(factor);
        delay.min(self.cap)
    }

    /// The jittered delay for retry number `retry`. Jitter spreads
    /// concurrent mediator calls so they do not retry in lockstep.
    pub fn delay(&self, retry: u32) -> Duration {
        let raw = self.raw_delay(retry);
        if self.jitter <= 0.0 {
            return raw;
        }
        let scale = rand::thread_rng().gen_range(1.0 - self.jitter..=1.0 + self.jitter);
        raw.mul_f64(scale.max(0.0))
    }
}

/// What the caller should do after recording a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Wait this long, then try again.
    RetryAfter(Duration),
    /// Budget exhausted; surface a terminal failure.
    GiveUp,
}

/// Per-call retry state. Attempts within one mediator invocation are
/// strictly sequential, so this is plain mutable state with no locking.
#[derive(Debug, Clone)]
pub struct RetryState {
    max_attempts: u32,
    max_rate_limit_retries: u32,
    attempt_policy: BackoffPolicy,
    rate_limit_policy: BackoffPolicy,
    attempts: u32,
    rate_limit_retries: u32,
}

impl RetryState {
    pub fn new(
        max_attempts: u32,
        max_rate_limit_retries: u32,
        attempt_policy: BackoffPolicy,
        rate_limit_policy: BackoffPolicy,
    ) -> Self {
        Self {
            max_attempts,
            max_rate_limit_retries,
            attempt_policy,
            rate_limit_policy,
            attempts: 0,
            rate_limit_retries: 0,
        }
    }

    /// Quality attempts consumed so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Rate-limit retries consumed so far.
    pub fn rate_limit_retries(&self) -> u32 {
        self.rate_limit_retries
    }

    /// Record a quality failure (parse, shape, empty, timeout).
    pub fn record_attempt_failure(&mut self) -> NextStep {
        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            NextStep::GiveUp
        } else {
            NextStep::RetryAfter(self.attempt_policy.delay(self.attempts - 1))
        }
    }

    /// Record a provider-reported rate limit. A provider-supplied
    /// `retry_after` wins when it is longer than the computed backoff.
    pub fn record_rate_limit(&mut self, retry_after_secs: Option<u64>) -> NextStep {
        if self.rate_limit_retries >= self.max_rate_limit_retries {
            return NextStep::GiveUp;
        }
        let computed = self.rate_limit_policy.delay(self.rate_limit_retries);
        self.rate_limit_retries += 1;
        let delay = match retry_after_secs {
            Some(secs) => computed.max(Duration::from_secs(secs)),
            None => computed,
        };
        NextStep::RetryAfter(delay.min(self.rate_limit_policy.cap))
    }
}
