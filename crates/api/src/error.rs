//! Maps any [`NebulaError`] crossing into the gateway onto an HTTP response.
//!
//! A single `match` on [`NebulaError::kind`] decides the status code; the
//! body always carries `{code, message}` with secrets and raw upstream
//! payloads already stripped by the crate that raised the error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nebula_error::{ErrorKind, NebulaError};
use serde::Serialize;

/// Wraps a [`NebulaError`] so it can be returned directly from an axum
/// handler via `?`.
#[derive(Debug)]
pub struct ApiError(pub NebulaError);

impl From<NebulaError> for ApiError {
    fn from(err: NebulaError) -> Self {
        Self(err)
    }
}

impl From<nebula_engine::EngineError> for ApiError {
    fn from(err: nebula_engine::EngineError) -> Self {
        Self(err.into())
    }
}

impl From<nebula_credential::CredentialError> for ApiError {
    fn from(err: nebula_credential::CredentialError) -> Self {
        Self(err.into())
    }
}

impl From<nebula_credential_builtin::BuiltinConfigError> for ApiError {
    fn from(err: nebula_credential_builtin::BuiltinConfigError) -> Self {
        Self(err.into())
    }
}

impl From<nebula_workflow::WorkflowError> for ApiError {
    fn from(err: nebula_workflow::WorkflowError) -> Self {
        Self(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for_kind(self.0.kind());
        let body = ErrorBody {
            code: self.0.code(),
            message: self.0.message(),
            details: self.0.details(),
        };
        (status, Json(body)).into_response()
    }
}

/// The status mapping itself, exposed standalone so handlers that need to
/// inspect the status without consuming the error (e.g. for an SSE
/// `execution_failed` event) can reuse it.
#[must_use]
pub fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidWorkflow | ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::CredentialMissing | ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::AuthorizationFailed | ErrorKind::CredentialInvalid => StatusCode::FORBIDDEN,
        ErrorKind::InvalidState => StatusCode::CONFLICT,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::UpstreamTransient | ErrorKind::UpstreamPermanent => StatusCode::BAD_GATEWAY,
        ErrorKind::Canceled => StatusCode::CONFLICT,
        ErrorKind::SandboxError | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_is_bad_request() {
        assert_eq!(status_for_kind(ErrorKind::InvalidInput), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_through() {
        assert_eq!(status_for_kind(ErrorKind::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn rate_limited_is_429() {
        assert_eq!(status_for_kind(ErrorKind::RateLimited), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn internal_falls_back_to_500() {
        assert_eq!(status_for_kind(ErrorKind::Internal), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(status_for_kind(ErrorKind::SandboxError), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
