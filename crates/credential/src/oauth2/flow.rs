//! Authorization-code flow: build the authorize URL, then exchange the
//! callback's code for a stored credential.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use nebula_core::{CredentialKey, ProviderId, UserId};
use url::Url;

use crate::audit::AuditContext;
use crate::crypto::{generate_code_challenge, generate_pkce_verifier};
use crate::error::CredentialError;
use crate::oauth2::provider::ProviderOAuth2Config;
use crate::oauth2::state::{OAuth2StateRecord, OAuth2StateStore, StateToken};
use crate::store::{CredentialStore, NewOAuth2Credential, OAuth2Credential};

/// Exchanges an authorization code for tokens at a provider's token
/// endpoint. Implemented over `reqwest` by [`crate::oauth2::http::HttpOAuth2Client`]
/// (feature `oauth2-http`); kept as a trait so the flow has no compile-time
/// HTTP dependency and tests can supply a fake.
#[async_trait]
pub trait AuthorizationCodeExchanger: Send + Sync {
    /// Exchange `code` (received at the redirect URI) for tokens.
    async fn exchange_code(
        &self,
        provider: &ProviderId,
        config: &ProviderOAuth2Config,
        code: &str,
        redirect_uri: &Url,
        pkce_verifier: Option<&str>,
    ) -> Result<NewOAuth2Credential, CredentialError>;
}

/// Drives `begin_authorization`/`complete_authorization` against a closed
/// set of configured providers, backed by a [`OAuth2StateStore`] for CSRF
/// protection and a [`CredentialStore`] for the resulting credential.
pub struct OAuth2Flow {
    state_store: Arc<OAuth2StateStore>,
    credential_store: Arc<dyn CredentialStore>,
    exchanger: Arc<dyn AuthorizationCodeExchanger>,
    providers: HashMap<ProviderId, ProviderOAuth2Config>,
}

impl OAuth2Flow {
    /// Build a flow over the given state store, credential store, code
    /// exchanger, and provider registry.
    #[must_use]
    pub fn new(
        state_store: Arc<OAuth2StateStore>,
        credential_store: Arc<dyn CredentialStore>,
        exchanger: Arc<dyn AuthorizationCodeExchanger>,
        providers: HashMap<ProviderId, ProviderOAuth2Config>,
    ) -> Self {
        Self {
            state_store,
            credential_store,
            exchanger,
            providers,
        }
    }

    /// Generate an opaque state token, record the pending request, and
    /// return the provider's authorization URL with state and scopes
    /// encoded.
    pub fn begin_authorization(
        &self,
        user_id: UserId,
        provider: ProviderId,
        scopes: Vec<String>,
        redirect_uri: Url,
    ) -> Result<Url, CredentialError> {
        let config = self
            .providers
            .get(&provider)
            .ok_or_else(|| CredentialError::UnknownProvider(provider.to_string()))?;

        let scopes = if scopes.is_empty() {
            config.default_scopes.clone()
        } else {
            scopes
        };

        let pkce_verifier = config.use_pkce.then(generate_pkce_verifier);

        let token = self.state_store.insert(OAuth2StateRecord {
            user_id,
            provider: provider.clone(),
            requested_scopes: scopes.clone(),
            redirect_uri: redirect_uri.clone(),
            pkce_verifier: pkce_verifier.clone(),
        });

        let mut url = config.authorize_url.clone();
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("response_type", "code");
            q.append_pair("client_id", &config.client_id);
            q.append_pair("redirect_uri", redirect_uri.as_str());
            q.append_pair("scope", &scopes.join(" "));
            q.append_pair("state", token.as_str());
            if let Some(verifier) = &pkce_verifier {
                q.append_pair("code_challenge", &generate_code_challenge(verifier));
                q.append_pair("code_challenge_method", "S256");
            }
        }
        Ok(url)
    }

    /// Consume the state record for `state`, exchange `code` at the
    /// provider's token endpoint, and store the resulting credential.
    pub async fn complete_authorization(
        &self,
        provider: ProviderId,
        code: &str,
        state: &StateToken,
        ctx: &AuditContext,
    ) -> Result<OAuth2Credential, CredentialError> {
        let record = self.state_store.consume(state)?;
        if record.provider != provider {
            return Err(CredentialError::InvalidState);
        }

        let config = self
            .providers
            .get(&provider)
            .ok_or_else(|| CredentialError::UnknownProvider(provider.to_string()))?;

        let new_cred = self
            .exchanger
            .exchange_code(
                &provider,
                config,
                code,
                &record.redirect_uri,
                record.pkce_verifier.as_deref(),
            )
            .await?;

        let key = CredentialKey::new(record.user_id, provider.as_str(), provider.as_str());
        self.credential_store.store(&key, new_cred, ctx).await?;
        self.credential_store.get(&key, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCredentialStore;
    use nebula_schema::SecretString;
    use std::time::Duration;

    fn google_config(use_pkce: bool) -> ProviderOAuth2Config {
        ProviderOAuth2Config {
            client_id: "client-123".into(),
            client_secret: SecretString::new("shh"),
            authorize_url: Url::parse("https://accounts.google.invalid/o/oauth2/auth").unwrap(),
            token_url: Url::parse("https://oauth2.googleapis.invalid/token").unwrap(),
            default_scopes: vec!["calendar.events".into()],
            use_pkce,
        }
    }

    struct FakeExchanger;
    #[async_trait]
    impl AuthorizationCodeExchanger for FakeExchanger {
        async fn exchange_code(
            &self,
            _provider: &ProviderId,
            _config: &ProviderOAuth2Config,
            code: &str,
            _redirect_uri: &Url,
            _pkce_verifier: Option<&str>,
        ) -> Result<NewOAuth2Credential, CredentialError> {
            Ok(NewOAuth2Credential {
                access_token: SecretString::new(format!("access-for-{code}")),
                refresh_token: Some(SecretString::new("refresh-1")),
                token_type: "Bearer".into(),
                expires_at: None,
                scopes: vec!["calendar.events".into()],
            })
        }
    }

    fn flow(use_pkce: bool) -> OAuth2Flow {
        let mut providers = HashMap::new();
        providers.insert(ProviderId::new("google_calendar"), google_config(use_pkce));
        OAuth2Flow::new(
            Arc::new(OAuth2StateStore::new(Duration::from_secs(1800))),
            Arc::new(InMemoryCredentialStore::new("secret").unwrap()),
            Arc::new(FakeExchanger),
            providers,
        )
    }

    #[test]
    fn begin_authorization_encodes_state_and_scopes() {
        let flow = flow(true);
        let url = flow
            .begin_authorization(
                UserId::v4(),
                ProviderId::new("google_calendar"),
                vec![],
                Url::parse("https://app.example.invalid/callback").unwrap(),
            )
            .unwrap();

        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.get("response_type").unwrap(), "code");
        assert_eq!(pairs.get("scope").unwrap(), "calendar.events");
        assert!(pairs.contains_key("state"));
        assert!(pairs.contains_key("code_challenge"));
        assert_eq!(pairs.get("code_challenge_method").unwrap(), "S256");
    }

    #[test]
    fn begin_authorization_omits_pkce_when_disabled() {
        let flow = flow(false);
        let url = flow
            .begin_authorization(
                UserId::v4(),
                ProviderId::new("google_calendar"),
                vec![],
                Url::parse("https://app.example.invalid/callback").unwrap(),
            )
            .unwrap();
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert!(!pairs.contains_key("code_challenge"));
    }

    #[test]
    fn begin_authorization_rejects_unknown_provider() {
        let flow = flow(true);
        assert!(matches!(
            flow.begin_authorization(
                UserId::v4(),
                ProviderId::new("not_a_provider"),
                vec![],
                Url::parse("https://app.example.invalid/callback").unwrap(),
            ),
            Err(CredentialError::UnknownProvider(_))
        ));
    }

    #[tokio::test]
    async fn complete_authorization_stores_and_returns_credential() {
        let flow = flow(true);
        let user_id = UserId::v4();
        let url = flow
            .begin_authorization(
                user_id,
                ProviderId::new("google_calendar"),
                vec![],
                Url::parse("https://app.example.invalid/callback").unwrap(),
            )
            .unwrap();
        let state = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| StateToken::from(v.into_owned()))
            .unwrap();

        let ctx = AuditContext::new(user_id);
        let cred = flow
            .complete_authorization(ProviderId::new("google_calendar"), "auth-code", &state, &ctx)
            .await
            .unwrap();

        assert_eq!(cred.access_token, SecretString::new("access-for-auth-code"));
    }

    #[tokio::test]
    async fn complete_authorization_state_is_single_use() {
        let flow = flow(true);
        let user_id = UserId::v4();
        let url = flow
            .begin_authorization(
                user_id,
                ProviderId::new("google_calendar"),
                vec![],
                Url::parse("https://app.example.invalid/callback").unwrap(),
            )
            .unwrap();
        let state = url
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| StateToken::from(v.into_owned()))
            .unwrap();

        let ctx = AuditContext::new(user_id);
        flow.complete_authorization(ProviderId::new("google_calendar"), "auth-code", &state, &ctx)
            .await
            .unwrap();

        assert!(matches!(
            flow.complete_authorization(ProviderId::new("google_calendar"), "auth-code", &state, &ctx)
                .await,
            Err(CredentialError::InvalidState)
        ));
    }
}
