//! The closed [`ErrorKind`] taxonomy shared by every Nebula crate.
//!
//! Every error that crosses a crate boundary is reported as one of these
//! kinds. The set is intentionally closed: adding a new failure mode means
//! picking the existing kind it maps to, not growing the enum, so callers
//! can exhaustively match on it (workflow execution reports, HTTP status
//! mapping, retry policy) without a wildcard arm silently swallowing new
//! variants.

use serde::{Deserialize, Serialize};

/// Classification of a [`NebulaError`](crate::NebulaError).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A workflow definition is structurally invalid (cycle, dangling
    /// connection, unknown node kind).
    InvalidWorkflow,
    /// A node received input it cannot process (schema mismatch, missing
    /// required parameter after merge).
    InvalidInput,
    /// No credential exists for the requested `(user, provider,
    /// integration)` triple.
    CredentialMissing,
    /// A credential exists but fails to decrypt or is otherwise unusable.
    CredentialInvalid,
    /// An OAuth2 authorization attempt was rejected by the provider or the
    /// local state/PKCE check.
    AuthorizationFailed,
    /// An operation was attempted from a state that does not permit it
    /// (e.g. resuming a workflow that is not `Waiting`).
    InvalidState,
    /// The caller is not permitted to perform the requested operation.
    Unauthorized,
    /// The requested resource does not exist.
    NotFound,
    /// The upstream provider rate-limited the request.
    RateLimited,
    /// A transient failure on the upstream side; safe to retry.
    UpstreamTransient,
    /// A permanent failure on the upstream side; retrying will not help.
    UpstreamPermanent,
    /// An operation exceeded its configured timeout.
    Timeout,
    /// The operation was canceled, either by the caller or by workflow
    /// cancellation propagation.
    Canceled,
    /// The conversion-function sandbox rejected or failed to evaluate an
    /// expression.
    SandboxError,
    /// An unexpected internal failure with no more specific classification.
    Internal,
}

impl ErrorKind {
    /// Whether an operation that failed with this kind is safe to retry
    /// without caller intervention.
    ///
    /// This is the *default* retryability for the kind; `NebulaError`
    /// carries its own `retryable` flag that individual call sites may
    /// override (e.g. a `RateLimited` error with a known `Retry-After`).
    #[must_use]
    pub fn is_retryable_by_default(self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::UpstreamTransient | Self::Timeout
        )
    }

    /// A short, stable machine-readable code for this kind (used as the
    /// `code` field default and in API error bodies).
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::InvalidWorkflow => "invalid_workflow",
            Self::InvalidInput => "invalid_input",
            Self::CredentialMissing => "credential_missing",
            Self::CredentialInvalid => "credential_invalid",
            Self::AuthorizationFailed => "authorization_failed",
            Self::InvalidState => "invalid_state",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::UpstreamTransient => "upstream_transient",
            Self::UpstreamPermanent => "upstream_permanent",
            Self::Timeout => "timeout",
            Self::Canceled => "canceled",
            Self::SandboxError => "sandbox_error",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds_match_spec() {
        assert!(ErrorKind::RateLimited.is_retryable_by_default());
        assert!(ErrorKind::UpstreamTransient.is_retryable_by_default());
        assert!(ErrorKind::Timeout.is_retryable_by_default());
        assert!(!ErrorKind::UpstreamPermanent.is_retryable_by_default());
        assert!(!ErrorKind::InvalidInput.is_retryable_by_default());
    }

    #[test]
    fn code_round_trips_through_display() {
        assert_eq!(ErrorKind::CredentialMissing.to_string(), "credential_missing");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ErrorKind::UpstreamPermanent).unwrap();
        assert_eq!(json, "\"upstream_permanent\"");
    }
}
