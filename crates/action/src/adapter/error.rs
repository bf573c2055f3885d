//! Error type unifying credential-resolution and HTTP failures for one
//! adapter call.

use crate::http::RequestError;

/// Either the credential resolution step or the HTTP call itself failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AdapterError {
    /// Resolving or refreshing the access token failed.
    #[error(transparent)]
    Credential(#[from] nebula_error::NebulaError),

    /// The HTTP call itself failed after exhausting retries (or failed
    /// with a non-retryable status).
    #[error(transparent)]
    Request(#[from] RequestError),
}

impl From<AdapterError> for nebula_error::NebulaError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::Credential(inner) => inner,
            AdapterError::Request(inner) => inner.into(),
        }
    }
}
