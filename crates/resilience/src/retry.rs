//! Retry with exponential backoff (spec §4.4: "retry up to 3 times with
//! exponential backoff (2s, 4s, 8s)"; a 429 with `Retry-After` respects the
//! provider's hint, capped at 30s).

use std::future::Future;
use std::time::Duration;

use crate::error::ResilienceError;

/// Extends [`nebula_error::Retryable`] with an optional server-provided
/// retry hint (`Retry-After`), so [`RetryPolicy`] can both decide whether a
/// failure is worth retrying and honor the upstream's requested delay.
pub trait Retryable: nebula_error::Retryable {
    /// A server-suggested delay before the next attempt (e.g. parsed from
    /// a `Retry-After` header), if any.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Fixed retry schedule: up to `max_attempts` tries total, sleeping
/// `backoff[attempt - 1]` (saturating at the last entry) between them.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (spec default: 3).
    pub max_attempts: u32,
    /// Backoff durations by attempt index (spec default: `[2s, 4s, 8s]`).
    pub backoff: Vec<Duration>,
    /// Upper bound applied to a provider's `Retry-After` hint (spec
    /// default: 30s).
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: vec![Duration::from_secs(2), Duration::from_secs(4), Duration::from_secs(8)],
            max_retry_after: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Run `operation` until it succeeds, exhausts the attempt budget, or
    /// fails with a non-retryable error.
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, ResilienceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + std::fmt::Display,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !err.is_retryable() {
                        return Err(ResilienceError::RetriesExhausted {
                            attempts: attempt,
                            last_error: err.to_string(),
                        });
                    }
                    let delay = err
                        .retry_after()
                        .map(|hint| hint.min(self.max_retry_after))
                        .unwrap_or_else(|| self.delay_for_attempt(attempt));
                    tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, error = %err, "retrying after transient failure");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let idx = (attempt as usize).saturating_sub(1);
        self.backoff.get(idx).copied().unwrap_or_else(|| *self.backoff.last().expect("non-empty backoff schedule"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug)]
    struct TransientError(&'static str);
    impl std::fmt::Display for TransientError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0)
        }
    }
    impl nebula_error::Retryable for TransientError {
        fn is_retryable(&self) -> bool {
            true
        }
    }
    impl Retryable for TransientError {}

    #[derive(Debug)]
    struct FatalError;
    impl std::fmt::Display for FatalError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fatal")
        }
    }
    impl nebula_error::Retryable for FatalError {
        fn is_retryable(&self) -> bool {
            false
        }
    }
    impl Retryable for FatalError {}

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let attempts = AtomicU32::new(0);
        let policy = RetryPolicy::default();
        let result = policy
            .execute(|| {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(TransientError("try again"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_budget_and_reports_attempts() {
        let policy = RetryPolicy { max_attempts: 3, ..RetryPolicy::default() };
        let result: Result<(), _> = policy.execute(|| async { Err(TransientError("down")) }).await;
        match result.unwrap_err() {
            ResilienceError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn does_not_retry_non_retryable_errors() {
        let attempts = AtomicU32::new(0);
        let policy = RetryPolicy::default();
        let result: Result<(), _> = policy
            .execute(|| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(FatalError) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_hint_is_capped() {
        #[derive(Debug)]
        struct RateLimited(Duration);
        impl std::fmt::Display for RateLimited {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "rate limited")
            }
        }
        impl nebula_error::Retryable for RateLimited {
            fn is_retryable(&self) -> bool {
                true
            }
        }
        impl Retryable for RateLimited {
            fn retry_after(&self) -> Option<Duration> {
                Some(self.0)
            }
        }

        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));

        let hint = Duration::from_secs(120);
        let capped = hint.min(policy.max_retry_after);
        assert_eq!(capped, Duration::from_secs(30));
        let _ = RateLimited(hint);
    }
}
