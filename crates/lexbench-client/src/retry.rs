use std::time::Duration;

use lexbench_core::error::CallError;

/// Bounded retry with backoff for transient call failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never exceeded.
    pub max_attempts: u32,
    /// Base delay; doubles each attempt.
    pub base_backoff: Duration,
    /// Floor delay after a rate-limit response.
    pub rate_limit_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(500),
            rate_limit_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt following `attempt` (1-based), given the
    /// error that failed it. Rate limits wait at least the rate-limit floor,
    /// or the server-suggested interval when longer.
    pub fn backoff_for(&self, attempt: u32, error: &CallError) -> Duration {
        let exponential = self.base_backoff * 2u32.saturating_pow(attempt.saturating_sub(1));
        match error {
            CallError::RateLimited { retry_after_secs } => {
                let suggested = retry_after_secs.map(Duration::from_secs);
                self.rate_limit_backoff
                    .max(suggested.unwrap_or(Duration::ZERO))
                    .max(exponential)
            }
            _ => exponential,
        }
    }
}
