//! Resilience error types.

/// Errors raised by retry and circuit breaker execution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResilienceError {
    /// The operation exhausted its retry budget. Carries the last
    /// attempt's error message.
    #[error("retries exhausted after {attempts} attempt(s): {last_error}")]
    RetriesExhausted {
        /// Total attempts made, including the first.
        attempts: u32,
        /// The last attempt's error, stringified.
        last_error: String,
    },

    /// The circuit is open; the call was rejected without attempting it.
    #[error("circuit breaker is open")]
    CircuitOpen,
}

impl From<ResilienceError> for nebula_error::NebulaError {
    fn from(err: ResilienceError) -> Self {
        use nebula_error::NebulaError;
        match &err {
            ResilienceError::RetriesExhausted { .. } => NebulaError::upstream_transient(err.to_string()),
            ResilienceError::CircuitOpen => NebulaError::upstream_transient(err.to_string()),
        }
    }
}
