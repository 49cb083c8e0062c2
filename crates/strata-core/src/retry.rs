//! Bounded exponential-backoff retry for transient request failures
//!
//! This is the transport-level retry primitive (token acquisition, flaky
//! submissions). It is deliberately not used by the operation poller: a poll
//! loop has its own pacing from the server's retry hints, and a transport
//! error there propagates immediately.

use std::future::Future;
use std::time::Duration;

use strata_api::ApiError;
use tracing::debug;

/// Backoff policy for [`retry_with_backoff`]
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total attempt budget, including the first attempt
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Factor applied to the delay after each retry
    pub multiplier: u32,
    /// Cap on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            multiplier: 2,
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Policy from a profile's retry configuration; a disabled config
    /// collapses to a single attempt
    #[must_use]
    pub fn from_config(config: &crate::config::RetryConfig) -> Self {
        Self {
            max_attempts: if config.enabled {
                config.max_attempts.max(1)
            } else {
                1
            },
            base_delay: Duration::from_millis(config.backoff_ms),
            multiplier: 2,
            max_delay: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Delay before the given retry (1-based): `base * multiplier^(retry-1)`,
    /// capped at `max_delay`
    fn delay_for(&self, retry: u32) -> Duration {
        let pow = self.multiplier.saturating_pow(retry.saturating_sub(1));
        let millis = self
            .base_delay
            .as_millis()
            .saturating_mul(pow as u128)
            .min(self.max_delay.as_millis());
        Duration::from_millis(millis as u64)
    }
}

/// Classification returned by a retryable unit of work
#[derive(Debug)]
pub enum RetryError<E> {
    /// Stop immediately and surface the error
    Permanent(E),
    /// Worth another attempt if the budget allows
    Transient(E),
}

/// Classify an API error for the retry loop: server errors, throttling, and
/// connection-level resets are transient; everything else is permanent.
pub fn classify_api_error(err: ApiError) -> RetryError<ApiError> {
    if err.is_retryable() {
        RetryError::Transient(err)
    } else {
        RetryError::Permanent(err)
    }
}

/// Invoke `work` until it succeeds, fails permanently, or the attempt budget
/// is exhausted.
///
/// The first attempt runs immediately; each retry waits
/// `base_delay * multiplier^(retry-1)`. The closure receives the 1-based
/// attempt number and classifies its own failures. After the budget is
/// exhausted the last observed error is returned as-is.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: RetryPolicy, mut work: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, RetryError<E>>>,
{
    let budget = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match work(attempt).await {
            Ok(value) => return Ok(value),
            Err(RetryError::Permanent(err)) => return Err(err),
            Err(RetryError::Transient(err)) => {
                if attempt >= budget {
                    return Err(err);
                }
                let delay = policy.delay_for(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "transient failure, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(5),
            multiplier: 2,
            max_delay: Duration::from_millis(50),
        }
    }

    #[test]
    fn test_delay_growth_and_cap() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            multiplier: 2,
            max_delay: Duration::from_millis(500),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(4), Duration::from_millis(500));
        assert_eq!(policy.delay_for(30), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_always_transient_exhausts_exact_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retry_with_backoff(fast_policy(4), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(RetryError::Transient(format!("attempt {attempt} failed"))) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(result.unwrap_err(), "attempt 4 failed");
    }

    #[tokio::test]
    async fn test_permanent_failure_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = retry_with_backoff(fast_policy(5), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RetryError::Permanent("no point retrying")) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err(), "no point retrying");
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<&str, &str> = retry_with_backoff(fast_policy(5), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(RetryError::Transient("not yet"))
                } else {
                    Ok("made it")
                }
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.unwrap(), "made it");
    }

    #[tokio::test]
    async fn test_zero_attempt_budget_still_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), &str> = retry_with_backoff(fast_policy(0), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RetryError::Transient("nope")) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.is_err());
    }

    #[test]
    fn test_classify_api_error() {
        let transient = classify_api_error(ApiError::Server {
            code: 502,
            message: "bad gateway".to_string(),
        });
        assert!(matches!(transient, RetryError::Transient(_)));

        let permanent = classify_api_error(ApiError::NotFound {
            message: "gone".to_string(),
        });
        assert!(matches!(permanent, RetryError::Permanent(_)));
    }
}
