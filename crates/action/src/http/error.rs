//! Errors raised while building or executing an HTTP request.

use std::time::Duration;

use nebula_resilience::Retryable as ResilienceRetryable;

/// Errors raised by the generic HTTP adapter.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RequestError {
    /// The request had no usable URL, or the URL failed to parse.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request could not be built (e.g. an incompatible body/method
    /// combination).
    #[error("failed to build request: {0}")]
    Build(String),

    /// Connect or read timeout elapsed.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// A transport-level failure (DNS, connection refused, TLS, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The response body exceeded the configured size limit and was
    /// truncated; this is treated as a hard error rather than a partial
    /// read.
    #[error("response body exceeded {limit_bytes} byte limit")]
    ResponseTooLarge {
        /// The configured cap that was exceeded.
        limit_bytes: u64,
    },

    /// The upstream responded with a non-2xx status.
    #[error("upstream returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Status text or a snippet of the response body.
        message: String,
        /// `Retry-After` value, parsed from the response, if any.
        retry_after: Option<Duration>,
    },

    /// Failed to serialize a request body or deserialize a response body.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Any other failure.
    #[error("request error: {0}")]
    Other(String),
}

impl RequestError {
    /// `true` for 401/403 responses — callers should attempt exactly one
    /// credential refresh and retry, rather than falling back to the
    /// generic backoff schedule.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Http { status: 401 | 403, .. })
    }

    /// The HTTP status code, if this was an [`RequestError::Http`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl nebula_error::Retryable for RequestError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Http { status, .. } => matches!(status, 408 | 429) || *status >= 500,
            Self::InvalidUrl(_) | Self::Build(_) | Self::ResponseTooLarge { .. } | Self::Serialization(_) | Self::Other(_) => false,
        }
    }
}

impl ResilienceRetryable for RequestError {
    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Http { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<RequestError> for nebula_error::NebulaError {
    fn from(err: RequestError) -> Self {
        use nebula_error::NebulaError;
        match &err {
            RequestError::InvalidUrl(_) | RequestError::Build(_) | RequestError::Serialization(_) => NebulaError::invalid_input(err.to_string()),
            RequestError::Timeout(_) => NebulaError::timeout(err.to_string()),
            RequestError::Network(_) => NebulaError::upstream_transient(err.to_string()),
            RequestError::ResponseTooLarge { .. } => NebulaError::upstream_permanent(err.to_string()),
            RequestError::Http { status: 401 | 403, .. } => NebulaError::unauthorized(err.to_string()),
            RequestError::Http { status, .. } if *status == 429 || *status >= 500 => NebulaError::upstream_transient(err.to_string()),
            RequestError::Http { .. } => NebulaError::upstream_permanent(err.to_string()),
            RequestError::Other(_) => NebulaError::internal(err.to_string()),
        }
    }
}
