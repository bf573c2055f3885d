//! The port through which a tool adapter resolves and refreshes access
//! tokens, without depending on `nebula-credential`'s storage concerns.
//!
//! `nebula-runtime` implements this trait over `nebula_credential::CredentialStore`
//! and `OAuth2Flow`; tests and examples can implement it directly.

use async_trait::async_trait;
use nebula_core::CredentialKey;
use nebula_error::NebulaError;

/// A resolved, usable access token for one credential.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The bearer value to send upstream.
    pub token: String,
}

/// Resolves and refreshes OAuth2 access tokens on behalf of a tool
/// adapter. A `CredentialMissing` error means no credential exists for
/// the key; a `CredentialInvalid` error means refresh was attempted and
/// failed.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Return the current access token for `key`, without forcing a
    /// refresh.
    async fn access_token(&self, key: &CredentialKey) -> Result<AccessToken, NebulaError>;

    /// Force a refresh and return the new access token. Called exactly
    /// once per failed request, after a `401`/`403` response.
    async fn refresh(&self, key: &CredentialKey) -> Result<AccessToken, NebulaError>;
}
