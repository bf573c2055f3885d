//! Per-provider OAuth2 endpoint configuration (spec: `provider_*_client_id/
//! secret/authorize_url/token_url/default_scopes`).

use nebula_schema::SecretString;
use url::Url;

/// The configuration needed to drive the authorization-code flow against
/// one provider.
#[derive(Debug, Clone)]
pub struct ProviderOAuth2Config {
    /// OAuth2 client id, issued by the provider.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: SecretString,
    /// The provider's authorization endpoint.
    pub authorize_url: Url,
    /// The provider's token endpoint.
    pub token_url: Url,
    /// Scopes requested when the caller doesn't specify any.
    pub default_scopes: Vec<String>,
    /// Whether to use PKCE (RFC 7636). Optional per provider: some
    /// (Google, GitHub) support and recommend it; others ignore the
    /// parameters entirely, so sending them is harmless but not useful.
    pub use_pkce: bool,
}
