//! A minimal circuit breaker: trips after a run of consecutive failures,
//! rejects calls while open, and allows a single probe call once the reset
//! timeout elapses.

use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Circuit breaker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Calls pass through normally.
    Closed,
    /// Calls are rejected without being attempted.
    Open,
    /// A single probe call is allowed to test recovery.
    HalfOpen,
}

/// Tuning for a [`CircuitBreaker`].
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// How long the circuit stays open before allowing a probe call.
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 5, reset_timeout: Duration::from_secs(30) }
    }
}

/// Point-in-time stats snapshot, for diagnostics and logging.
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerStats {
    /// Current state.
    pub state: State,
    /// Consecutive failures recorded since the last success.
    pub consecutive_failures: u32,
}

struct Inner {
    state: State,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Error returned by [`CircuitBreaker::execute`]: either the circuit was
/// open, or the wrapped operation itself failed.
#[derive(Debug)]
pub enum CircuitBreakerError<E> {
    /// The circuit was open; the operation was never attempted.
    Open,
    /// The operation ran and failed.
    Inner(E),
}

impl<E: fmt::Display> fmt::Display for CircuitBreakerError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "circuit breaker is open"),
            Self::Inner(err) => write!(f, "{err}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for CircuitBreakerError<E> {}

/// Tracks consecutive failures for one logical upstream (e.g. one
/// `(user, provider)` pair) and short-circuits calls once it trips.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Build a breaker with an explicit config.
    pub fn with_config(config: CircuitBreakerConfig) -> Self {
        Self { config, inner: Mutex::new(Inner { state: State::Closed, consecutive_failures: 0, opened_at: None }) }
    }

    /// Build a breaker with [`CircuitBreakerConfig::default`].
    pub fn with_defaults() -> Self {
        Self::with_config(CircuitBreakerConfig::default())
    }

    /// Current state, advancing `Open` to `HalfOpen` once the reset timeout
    /// has elapsed.
    pub fn state(&self) -> State {
        let mut inner = self.inner.lock().expect("circuit breaker mutex poisoned");
        self.maybe_transition_to_half_open(&mut inner);
        inner.state
    }

    fn maybe_transition_to_half_open(&self, inner: &mut Inner) {
        if inner.state == State::Open {
            if let Some(opened_at) = inner.opened_at {
                if opened_at.elapsed() >= self.config.reset_timeout {
                    inner.state = State::HalfOpen;
                }
            }
        }
    }

    /// Whether a call is currently allowed through.
    pub fn can_execute(&self) -> bool {
        !matches!(self.state(), State::Open)
    }

    /// `true` iff the breaker is closed.
    pub fn is_closed(&self) -> bool {
        self.state() == State::Closed
    }

    /// `true` iff the breaker is open.
    pub fn is_open(&self) -> bool {
        self.state() == State::Open
    }

    /// `true` iff the breaker is half-open (probing for recovery).
    pub fn is_half_open(&self) -> bool {
        self.state() == State::HalfOpen
    }

    /// Record a successful call: closes the circuit and resets the failure
    /// count.
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker mutex poisoned");
        inner.state = State::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    /// Record a failed call, tripping the breaker if the threshold is
    /// reached (or immediately, if this was a half-open probe).
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("circuit breaker mutex poisoned");
        inner.consecutive_failures += 1;
        if inner.state == State::HalfOpen || inner.consecutive_failures >= self.config.failure_threshold {
            inner.state = State::Open;
            inner.opened_at = Some(Instant::now());
        }
    }

    /// Force the breaker back to closed, clearing failure history.
    pub fn reset(&self) {
        self.record_success();
    }

    /// Current stats snapshot.
    pub fn stats(&self) -> CircuitBreakerStats {
        let mut inner = self.inner.lock().expect("circuit breaker mutex poisoned");
        self.maybe_transition_to_half_open(&mut inner);
        CircuitBreakerStats { state: inner.state, consecutive_failures: inner.consecutive_failures }
    }

    /// Run `operation` if the circuit allows it, updating state from the
    /// outcome.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
    {
        if !self.can_execute() {
            return Err(CircuitBreakerError::Open);
        }
        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(err) => {
                self.record_failure();
                Err(CircuitBreakerError::Inner(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_failures() {
        let breaker = CircuitBreaker::with_config(CircuitBreakerConfig { failure_threshold: 3, reset_timeout: Duration::from_secs(30) });
        assert!(breaker.is_closed());
        breaker.record_failure();
        breaker.record_failure();
        assert!(breaker.is_closed());
        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[test]
    fn success_resets_failure_count() {
        let breaker = CircuitBreaker::with_config(CircuitBreakerConfig { failure_threshold: 2, reset_timeout: Duration::from_secs(30) });
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        assert!(breaker.is_closed());
    }

    #[test]
    fn half_open_failure_reopens_immediately() {
        let breaker = CircuitBreaker::with_config(CircuitBreakerConfig { failure_threshold: 1, reset_timeout: Duration::from_millis(0) });
        breaker.record_failure();
        assert!(breaker.is_half_open() || breaker.is_open());
        let _ = breaker.state();
        assert!(breaker.is_half_open());
        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[tokio::test]
    async fn execute_rejects_without_calling_operation_when_open() {
        let breaker = CircuitBreaker::with_config(CircuitBreakerConfig { failure_threshold: 1, reset_timeout: Duration::from_secs(30) });
        breaker.record_failure();
        assert!(breaker.is_open());

        let mut called = false;
        let result: Result<(), CircuitBreakerError<&str>> = breaker
            .execute(|| {
                called = true;
                async { Ok(()) }
            })
            .await;
        assert!(!called);
        assert!(matches!(result, Err(CircuitBreakerError::Open)));
    }

    #[tokio::test]
    async fn execute_records_outcome() {
        let breaker = CircuitBreaker::with_defaults();
        let result: Result<u32, CircuitBreakerError<&str>> = breaker.execute(|| async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(breaker.stats().consecutive_failures, 0);

        let result: Result<u32, CircuitBreakerError<&str>> = breaker.execute(|| async { Err("boom") }).await;
        assert!(matches!(result, Err(CircuitBreakerError::Inner("boom"))));
        assert_eq!(breaker.stats().consecutive_failures, 1);
    }
}
