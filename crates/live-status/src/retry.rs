// Retry-with-backoff shared by the relay resolver.
//
// Linear backoff: attempt n (0-indexed) waits base * (n + 1), capped at
// max_delay. No sleep follows the final attempt.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::FetchError;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not counting the initial attempt).
    pub max_retries: u32,
    /// Delay unit. Attempt `n` is followed by `base_delay * (n + 1)`.
    pub base_delay: Duration,
    /// Hard cap on the computed delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// Compute the delay after a given failed attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay
            .checked_mul(attempt.saturating_add(1))
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Result of a single attempt, used by the caller to signal retryability.
pub enum RetryAction<T> {
    /// Operation succeeded.
    Success(T),
    /// Worth another attempt after the backoff delay.
    Retry(FetchError),
}

/// Execute an async operation with retry-and-backoff.
///
/// The `operation` closure receives the current attempt number (0-indexed).
/// Cancellation is checked before every attempt and during every sleep.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    operation: F,
) -> Result<T, FetchError>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = RetryAction<T>>,
{
    let mut last_error = None;

    for attempt in 0..=policy.max_retries {
        if token.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        match operation(attempt).await {
            RetryAction::Success(value) => return Ok(value),
            RetryAction::Retry(err) => {
                if attempt >= policy.max_retries {
                    return Err(err);
                }
                let delay = policy.delay_for_attempt(attempt);
                debug!(
                    attempt = attempt + 1,
                    max = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying after failed attempt"
                );
                last_error = Some(err);
                tokio::select! {
                    _ = token.cancelled() => {
                        return Err(FetchError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    Err(last_error.unwrap_or(FetchError::RelaysExhausted {
        attempts: policy.max_retries + 1,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> FetchError {
        FetchError::transport("https://relay.test", "reset")
    }

    #[test]
    fn test_delay_is_linear() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(3000));
    }

    #[test]
    fn test_delay_respects_max_cap() {
        let policy = RetryPolicy {
            max_retries: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        };
        assert_eq!(policy.delay_for_attempt(9), Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_first_attempt() {
        let token = CancellationToken::new();
        let result = retry_with_backoff(&RetryPolicy::default(), &token, |_| async {
            RetryAction::Success(42u32)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_then_fails_with_linear_waits() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1000));
        let token = CancellationToken::new();
        let attempts = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result: Result<u32, _> = retry_with_backoff(&policy, &token, |_| {
            attempts.fetch_add(1, Ordering::Relaxed);
            async { RetryAction::Retry(transient()) }
        })
        .await;

        assert!(result.is_err());
        // Initial attempt + 2 retries = 3 total
        assert_eq!(attempts.load(Ordering::Relaxed), 3);
        // 1s after the first failure, 2s after the second, nothing after the last.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(3000));
        assert!(elapsed < Duration::from_millis(4000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_means_single_attempt_without_sleep() {
        let token = CancellationToken::new();
        let attempts = AtomicU32::new(0);
        let started = tokio::time::Instant::now();
        let result: Result<u32, _> =
            retry_with_backoff(&RetryPolicy::new(0, Duration::from_secs(1)), &token, |_| {
                attempts.fetch_add(1, Ordering::Relaxed);
                async { RetryAction::Retry(transient()) }
            })
            .await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
        assert_eq!(attempts.load(Ordering::Relaxed), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_second_attempt() {
        let token = CancellationToken::new();
        let result = retry_with_backoff(&RetryPolicy::default(), &token, |attempt| async move {
            if attempt == 0 {
                RetryAction::Retry(transient())
            } else {
                RetryAction::Success(99u32)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
    }

    #[tokio::test(start_paused = true)]
    async fn test_respects_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let result: Result<u32, _> =
            retry_with_backoff(&RetryPolicy::default(), &token, |_| async {
                RetryAction::Success(1u32)
            })
            .await;
        assert!(matches!(result, Err(FetchError::Cancelled)));
    }
}
