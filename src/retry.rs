//! Retry policy, backoff calculation, and the shared retry/fallback
//! executors.
//!
//! Both the prediction orchestrator and the persistence orchestrator run
//! their external calls through `with_retry()` / `with_fallback()`, keeping
//! retry and fallback policy in a single place. Failures are classified
//! into the closed storage-error taxonomy before they propagate, so retry
//! exhaustion always surfaces as a [`StorageError`]-shaped failure.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::storage::classify;
use crate::telemetry;
use crate::{MuninnError, Result};

/// Configuration for retry behaviour on transient errors.
///
/// Uses bounded exponential backoff:
///
/// ```rust
/// # use muninn::RetryPolicy;
/// # use std::time::Duration;
/// let policy = RetryPolicy::new()
///     .max_attempts(5)
///     .base_delay(Duration::from_millis(200));
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Delay before the first retry. Default: 1s.
    pub base_delay: Duration,
    /// Maximum delay between retries (caps exponential growth). Default: 10s.
    pub max_delay: Duration,
    /// Multiplier applied per attempt. Default: 2.0.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the default bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Set the delay before the first retry.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the maximum delay between retries.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set the backoff multiplier.
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Backoff delay for a given attempt number (1-indexed).
    ///
    /// `base_delay * multiplier^(attempt-1)`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay = self.base_delay.mul_f64(self.backoff_multiplier.powi(exp));
        delay.min(self.max_delay)
    }
}

/// Execute an async operation with retry.
///
/// Every failure is classified into the storage taxonomy; retryable
/// classifications back off and retry up to `policy.max_attempts`,
/// non-retryable ones return immediately. The final classified error is
/// what propagates, wrapped as [`MuninnError::Storage`].
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, operation: &str, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let classified = classify(&e, operation);
                if !classified.retryable {
                    return Err(MuninnError::Storage(classified));
                }
                metrics::counter!(telemetry::RETRIES_TOTAL,
                    "operation" => operation.to_owned(),
                )
                .increment(1);
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    operation,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying after transient error"
                );
                tokio::time::sleep(delay).await;
                if attempt >= policy.max_attempts {
                    return Err(MuninnError::Storage(classified));
                }
                attempt += 1;
            }
        }
    }
}

/// Execute a primary operation with a fallback.
///
/// Runs `primary`; on any failure, classifies and logs it, then runs
/// `fallback`. If the fallback also fails, the **primary's** classified
/// error is what propagates — the fallback's failure is logged only.
pub async fn with_fallback<P, PFut, B, BFut, T>(
    primary: P,
    fallback: B,
    operation: &str,
) -> Result<T>
where
    P: FnOnce() -> PFut,
    PFut: Future<Output = Result<T>>,
    B: FnOnce() -> BFut,
    BFut: Future<Output = Result<T>>,
{
    let primary_err = match primary().await {
        Ok(result) => return Ok(result),
        Err(e) => classify(&e, operation),
    };

    metrics::counter!(telemetry::FALLBACKS_TOTAL,
        "operation" => operation.to_owned(),
    )
    .increment(1);
    warn!(
        operation,
        code = primary_err.code.as_str(),
        error = %primary_err,
        "primary failed, trying fallback"
    );

    match fallback().await {
        Ok(result) => Ok(result),
        Err(e) => {
            warn!(operation, error = %e, "fallback also failed");
            Err(MuninnError::Storage(primary_err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_exponentially_and_caps() {
        let policy = RetryPolicy::new()
            .base_delay(Duration::from_millis(1000))
            .max_delay(Duration::from_millis(10_000));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_millis(10_000));
    }

    #[test]
    fn disabled_policy_is_single_attempt() {
        assert_eq!(RetryPolicy::disabled().max_attempts, 1);
    }
}
