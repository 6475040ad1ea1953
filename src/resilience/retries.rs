//! Retry logic.
//!
//! # Responsibilities
//! - Decide which failures are retryable (a predicate over the error)
//! - Run an operation up to `max_attempts` times with backoff in between
//! - Return the last error unchanged once attempts are exhausted
//!
//! # Design Decisions
//! - The delay is a `tokio::time::sleep`, so dropping the future cancels
//!   pending retries along with the in-flight call
//! - Nothing is synthesized on exhaustion; callers see the real failure

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::resilience::backoff::Backoff;
use crate::upstream::UpstreamError;

/// Bounded retry policy, built once at startup.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
    retry_on: fn(&UpstreamError) -> bool,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            retry_on: UpstreamError::is_retryable,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Backoff::from_config(config.backoff, config.base_delay_ms, config.max_delay_ms),
        )
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self::new(1, Backoff::Fixed(Duration::ZERO))
    }

    /// Replace the retryable predicate.
    pub fn retry_on(mut self, predicate: fn(&UpstreamError) -> bool) -> Self {
        self.retry_on = predicate;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }

    /// Whether a failure of the given (1-based) attempt should be retried.
    pub fn should_retry(&self, attempt: u32, error: &UpstreamError) -> bool {
        attempt < self.max_attempts && (self.retry_on)(error)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Run `op` under `policy`, retrying retryable failures.
///
/// `dependency` only labels log lines and metrics.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, dependency: &str, mut op: F) -> Result<T, UpstreamError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) if policy.should_retry(attempt, &error) => {
                let delay = policy.delay(attempt);
                tracing::info!(
                    dependency,
                    attempt,
                    delay = ?delay,
                    error = %error,
                    "Retrying upstream call"
                );
                crate::observability::metrics::record_retry(dependency);
                tokio::time::sleep(delay).await;
            }
            Err(error) => return Err(error),
        }
    }
}
