use crate::error::{GeocodeError, RetryClass};
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Stop,
    RetryAfter(Duration),
}

/// Backoff policy for the geocoding attempt loop.
///
/// Rate-limited attempts back off exponentially (`rate_limit_base * 2^attempt`, capped at
/// `rate_limit_cap`); transient network failures back off linearly (`network_step * attempt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub rate_limit_base: Duration,
    pub rate_limit_cap: Duration,
    pub network_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            rate_limit_base: Duration::from_millis(1000),
            rate_limit_cap: Duration::from_millis(10_000),
            network_step: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(self, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..self
        }
    }

    /// Decide what to do after `attempt` (1-based) failed with `error`.
    pub fn classify(&self, attempt: u32, error: &GeocodeError) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::Stop;
        }
        match error.retry_class() {
            RetryClass::RateLimited => RetryDecision::RetryAfter(self.rate_limit_delay(attempt)),
            RetryClass::Transient => RetryDecision::RetryAfter(self.network_delay(attempt)),
            RetryClass::Fatal => RetryDecision::Stop,
        }
    }

    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.rate_limit_base
            .saturating_mul(factor)
            .min(self.rate_limit_cap)
    }

    pub fn network_delay(&self, attempt: u32) -> Duration {
        self.network_step.saturating_mul(attempt)
    }
}
