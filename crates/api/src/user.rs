//! Extracts the caller's identity from a pre-validated upstream header.
//!
//! End-user authentication itself is out of scope here: a fronting proxy
//! is assumed to have already authenticated the caller and to forward
//! their identity in `X-Nebula-User-Id`. This extractor only parses that
//! header into a [`UserId`]; it performs no credential check of its own.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use nebula_core::id::UserId;

/// The header a fronting proxy is expected to set after authenticating
/// the caller.
pub const USER_ID_HEADER: &str = "x-nebula-user-id";

/// The authenticated caller, extracted from [`USER_ID_HEADER`].
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub UserId);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or((StatusCode::UNAUTHORIZED, "missing X-Nebula-User-Id header"))?
            .to_str()
            .map_err(|_| (StatusCode::UNAUTHORIZED, "X-Nebula-User-Id header is not valid UTF-8"))?;
        let user_id = UserId::parse(raw)
            .map_err(|_| (StatusCode::UNAUTHORIZED, "X-Nebula-User-Id header is not a valid id"))?;
        Ok(Self(user_id))
    }
}
