//! The [`NebulaError`] type itself.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::ErrorContext;
use crate::kinds::ErrorKind;

/// A classified, contextualized error, returned by every fallible Nebula
/// operation.
///
/// `NebulaError` is deliberately a struct rather than an enum-per-crate:
/// the [`ErrorKind`] carries the classification, while `code`/`message`
/// carry the human- and machine-readable detail. This lets the API layer
/// (`nebula-api`) map any error from any crate to an HTTP status using a
/// single `match` on `kind()`, without needing a `From` impl per upstream
/// error type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NebulaError {
    kind: ErrorKind,
    code: String,
    message: String,
    details: Option<String>,
    retryable: bool,
    retry_after: Option<Duration>,
    context: ErrorContext,
}

impl NebulaError {
    /// Construct an error of the given kind with a message.
    ///
    /// `retryable` defaults to the kind's
    /// [`is_retryable_by_default`](ErrorKind::is_retryable_by_default).
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            code: kind.code().to_string(),
            retryable: kind.is_retryable_by_default(),
            message,
            details: None,
            retry_after: None,
            context: ErrorContext::new(),
        }
    }

    /// The error's classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The machine-readable code (defaults to the kind's code, but may be
    /// overridden with [`with_code`](Self::with_code) for finer-grained
    /// discrimination, e.g. `google_calendar_quota_exceeded`).
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Extended detail, if any (stack-trace-free, safe to log/return to
    /// callers — never put secret material here).
    #[must_use]
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Whether the caller may safely retry the operation that produced
    /// this error.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// The minimum delay before retrying, if the upstream provided one
    /// (e.g. a `Retry-After` header).
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// The contextual breadcrumbs attached so far.
    #[must_use]
    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// Override the machine-readable code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Attach extended detail.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Override retryability explicitly.
    #[must_use]
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Attach a minimum retry delay and mark the error retryable.
    #[must_use]
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self.retryable = true;
        self
    }

    /// Merge additional context into this error, preserving any context
    /// already set.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = self.context.merge(context);
        self
    }

    // Convenience constructors for the most frequently raised kinds.

    /// An [`ErrorKind::InvalidWorkflow`] error.
    pub fn invalid_workflow(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidWorkflow, message)
    }

    /// An [`ErrorKind::InvalidInput`] error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    /// An [`ErrorKind::CredentialMissing`] error.
    pub fn credential_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialMissing, message)
    }

    /// An [`ErrorKind::CredentialInvalid`] error.
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// An [`ErrorKind::AuthorizationFailed`] error.
    pub fn authorization_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthorizationFailed, message)
    }

    /// An [`ErrorKind::InvalidState`] error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    /// An [`ErrorKind::Unauthorized`] error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// An [`ErrorKind::NotFound`] error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// An [`ErrorKind::RateLimited`] error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    /// An [`ErrorKind::UpstreamTransient`] error.
    pub fn upstream_transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamTransient, message)
    }

    /// An [`ErrorKind::UpstreamPermanent`] error.
    pub fn upstream_permanent(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UpstreamPermanent, message)
    }

    /// An [`ErrorKind::Timeout`] error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// An [`ErrorKind::Canceled`] error.
    pub fn canceled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Canceled, message)
    }

    /// An [`ErrorKind::SandboxError`] error.
    pub fn sandbox_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SandboxError, message)
    }

    /// An [`ErrorKind::Internal`] error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl fmt::Display for NebulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, ": {details}")?;
        }
        Ok(())
    }
}

impl std::error::Error for NebulaError {}
