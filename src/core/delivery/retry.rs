//! Bounded retry with exponential backoff

use crate::domain::DeliveryError;
use crate::log_retry_attempt;
use std::future::Future;
use std::time::Duration;

/// Retry policy for one delivery
///
/// The operation runs at most `max_retries + 1` times. Before retry number
/// `n` (counting from 0) the policy sleeps `2^n × backoff_unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_unit: Duration) -> Self {
        Self {
            max_retries,
            backoff_unit,
        }
    }

    /// Total attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_unit.saturating_mul(factor)
    }

    /// Runs `operation` until it succeeds, fails permanently, or attempts run out
    ///
    /// Only errors reporting [`DeliveryError::is_retryable`] are retried; the
    /// last error is returned once attempts are exhausted.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, DeliveryError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, DeliveryError>>,
    {
        let mut attempt = 0;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    log_retry_attempt!(attempt + 1, self.max_retries, &err);
                    tracing::debug!(delay_ms = delay.as_millis() as u64, "Backing off");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
