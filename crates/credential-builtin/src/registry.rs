//! Assembles [`ProviderOAuth2Config`]s for the closed provider set from
//! configuration values (spec: `provider_*_client_id/secret/authorize_url/
//! token_url/default_scopes`, resolved at startup).

use std::collections::HashMap;

use nebula_core::ProviderId;
use nebula_credential::oauth2::ProviderOAuth2Config;
use nebula_credential::CredentialError;
use nebula_schema::SecretString;
use url::Url;

use crate::provider::WellKnownProvider;

/// The raw, per-provider configuration values a deployment supplies — one
/// instance per `provider_<name>_*` group in the closed configuration set.
#[derive(Debug, Clone)]
pub struct RawProviderConfig {
    /// `provider_<name>_client_id`.
    pub client_id: String,
    /// `provider_<name>_client_secret`.
    pub client_secret: SecretString,
    /// `provider_<name>_authorize_url`.
    pub authorize_url: String,
    /// `provider_<name>_token_url`.
    pub token_url: String,
    /// `provider_<name>_default_scopes`.
    pub default_scopes: Vec<String>,
}

/// Error building a [`ProviderRegistry`] from raw configuration.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuiltinConfigError {
    /// A configured provider name isn't one of the three this build supports.
    #[error("`{0}` is not a supported provider (expected one of google_calendar, github, slack)")]
    UnsupportedProvider(String),

    /// `authorize_url` or `token_url` wasn't a well-formed URL.
    #[error("invalid {field} for provider `{provider}`: {source}")]
    InvalidUrl {
        /// Provider the bad URL was configured for.
        provider: String,
        /// Which field failed to parse (`authorize_url` or `token_url`).
        field: &'static str,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },
}

impl From<BuiltinConfigError> for nebula_error::NebulaError {
    fn from(err: BuiltinConfigError) -> Self {
        nebula_error::NebulaError::invalid_state(err.to_string())
    }
}

/// The closed, resolved set of provider OAuth2 configurations this
/// deployment serves. Built once at startup from [`RawProviderConfig`]
/// entries and shared read-only afterward.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    configs: HashMap<ProviderId, ProviderOAuth2Config>,
}

impl ProviderRegistry {
    /// Build a registry from `(provider name, raw config)` pairs. Every
    /// name must be in the closed set; a name outside it is a startup
    /// configuration error, not a silently-ignored entry.
    pub fn from_raw(
        entries: impl IntoIterator<Item = (String, RawProviderConfig)>,
    ) -> Result<Self, BuiltinConfigError> {
        let mut configs = HashMap::new();
        for (name, raw) in entries {
            let provider = WellKnownProvider::parse(&name)
                .ok_or_else(|| BuiltinConfigError::UnsupportedProvider(name.clone()))?;
            let authorize_url =
                Url::parse(&raw.authorize_url).map_err(|source| BuiltinConfigError::InvalidUrl {
                    provider: name.clone(),
                    field: "authorize_url",
                    source,
                })?;
            let token_url = Url::parse(&raw.token_url).map_err(|source| BuiltinConfigError::InvalidUrl {
                provider: name.clone(),
                field: "token_url",
                source,
            })?;
            configs.insert(
                provider.id(),
                ProviderOAuth2Config {
                    client_id: raw.client_id,
                    client_secret: raw.client_secret,
                    authorize_url,
                    token_url,
                    default_scopes: raw.default_scopes,
                    use_pkce: provider.use_pkce(),
                },
            );
        }
        Ok(Self { configs })
    }

    /// Look up the resolved configuration for a provider.
    ///
    /// # Errors
    /// Returns [`CredentialError::UnknownProvider`] if `provider` wasn't
    /// configured (either outside the closed set, or simply never supplied
    /// to [`Self::from_raw`]).
    pub fn get(&self, provider: &ProviderId) -> Result<&ProviderOAuth2Config, CredentialError> {
        self.configs
            .get(provider)
            .ok_or_else(|| CredentialError::UnknownProvider(provider.to_string()))
    }

    /// Providers this registry has a resolved configuration for.
    pub fn configured_providers(&self) -> impl Iterator<Item = &ProviderId> {
        self.configs.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(client_id: &str) -> RawProviderConfig {
        RawProviderConfig {
            client_id: client_id.to_string(),
            client_secret: SecretString::new("shh"),
            authorize_url: "https://example.invalid/authorize".to_string(),
            token_url: "https://example.invalid/token".to_string(),
            default_scopes: vec!["read".to_string()],
        }
    }

    #[test]
    fn resolves_configured_provider() {
        let registry =
            ProviderRegistry::from_raw([("github".to_string(), raw("abc"))]).unwrap();
        let config = registry.get(&ProviderId::new("github")).unwrap();
        assert_eq!(config.client_id, "abc");
        assert!(config.use_pkce);
    }

    #[test]
    fn slack_resolves_without_pkce() {
        let registry =
            ProviderRegistry::from_raw([("slack".to_string(), raw("xyz"))]).unwrap();
        let config = registry.get(&ProviderId::new("slack")).unwrap();
        assert!(!config.use_pkce);
    }

    #[test]
    fn unknown_provider_name_is_a_config_error() {
        let err = ProviderRegistry::from_raw([("notion".to_string(), raw("abc"))]).unwrap_err();
        assert!(matches!(err, BuiltinConfigError::UnsupportedProvider(name) if name == "notion"));
    }

    #[test]
    fn unconfigured_provider_lookup_is_unknown_provider() {
        let registry = ProviderRegistry::from_raw([]).unwrap();
        let err = registry.get(&ProviderId::new("github")).unwrap_err();
        assert!(matches!(err, CredentialError::UnknownProvider(_)));
    }

    #[test]
    fn invalid_url_is_rejected_at_build_time() {
        let mut bad = raw("abc");
        bad.authorize_url = "not a url".to_string();
        let err = ProviderRegistry::from_raw([("github".to_string(), bad)]).unwrap_err();
        assert!(matches!(err, BuiltinConfigError::InvalidUrl { field: "authorize_url", .. }));
    }
}
