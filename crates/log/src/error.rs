//! Errors raised while setting up logging.

use nebula_error::NebulaError;

/// Failure to construct or install the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// The env-filter directive string failed to parse.
    #[error("invalid log filter {0}")]
    Filter(String),
    /// A global subscriber was already installed.
    #[error("a tracing subscriber is already set")]
    AlreadyInitialized,
}

/// Convenience alias for fallible logging setup.
pub type LogResult<T> = Result<T, LogError>;

impl From<LogError> for NebulaError {
    fn from(err: LogError) -> Self {
        NebulaError::internal(err.to_string())
    }
}
