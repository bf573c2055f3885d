#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Resilience
//!
//! Retry-with-backoff and circuit breaker primitives used by the tool
//! adapter layer when it talks to external services.
//!
//! - [`RetryPolicy`] implements the fixed retry schedule for transient
//!   upstream failures.
//! - [`CircuitBreaker`] trips after a run of consecutive failures against
//!   one upstream and short-circuits further calls until it recovers.

mod circuit_breaker;
mod error;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats, State};
pub use error::ResilienceError;
pub use retry::{Retryable, RetryPolicy};
