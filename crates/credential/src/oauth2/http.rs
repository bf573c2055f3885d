//! `reqwest`-backed implementation of [`AuthorizationCodeExchanger`] and
//! [`TokenRefresher`], behind the `oauth2-http` feature.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use nebula_core::{CredentialKey, ProviderId};
use nebula_schema::SecretString;
use serde::Deserialize;
use url::Url;

use crate::error::CredentialError;
use crate::oauth2::flow::AuthorizationCodeExchanger;
use crate::oauth2::provider::ProviderOAuth2Config;
use crate::store::{NewOAuth2Credential, RefreshedTokens, TokenRefresher};

#[derive(Debug, Deserialize)]
struct TokenResponseBody {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Calls the token endpoint of each configured provider over HTTP.
pub struct HttpOAuth2Client {
    http: reqwest::Client,
    providers: HashMap<ProviderId, ProviderOAuth2Config>,
}

impl HttpOAuth2Client {
    /// Build a client with its own short connect/read timeouts (spec:
    /// `http_connect_timeout_seconds` / `http_read_timeout_seconds`) and
    /// the closed provider registry it is allowed to talk to.
    #[must_use]
    pub fn new(providers: HashMap<ProviderId, ProviderOAuth2Config>) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client builds with static config");
        Self { http, providers }
    }

    async fn post_form(
        &self,
        token_url: &Url,
        form: &[(&str, &str)],
    ) -> Result<TokenResponseBody, CredentialError> {
        let response = self
            .http
            .post(token_url.clone())
            .form(form)
            .send()
            .await
            .map_err(|e| CredentialError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CredentialError::AuthorizationFailed(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        response
            .json::<TokenResponseBody>()
            .await
            .map_err(|e| CredentialError::Provider(format!("malformed token response: {e}")))
    }
}

#[async_trait]
impl AuthorizationCodeExchanger for HttpOAuth2Client {
    async fn exchange_code(
        &self,
        _provider: &ProviderId,
        config: &ProviderOAuth2Config,
        code: &str,
        redirect_uri: &Url,
        pkce_verifier: Option<&str>,
    ) -> Result<NewOAuth2Credential, CredentialError> {
        let redirect = redirect_uri.to_string();
        let client_secret = config.client_secret.expose().to_string();
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect.as_str()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ];
        if let Some(verifier) = pkce_verifier {
            form.push(("code_verifier", verifier));
        }

        let body = self.post_form(&config.token_url, &form).await?;
        let expires_at = body
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs as i64));

        Ok(NewOAuth2Credential {
            access_token: SecretString::new(body.access_token),
            refresh_token: body.refresh_token.map(SecretString::new),
            token_type: body.token_type,
            expires_at,
            scopes: body
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}

#[async_trait]
impl TokenRefresher for HttpOAuth2Client {
    async fn refresh_token(
        &self,
        key: &CredentialKey,
        refresh_token: &SecretString,
    ) -> Result<RefreshedTokens, CredentialError> {
        let config = self
            .providers
            .get(&key.provider)
            .ok_or_else(|| CredentialError::UnknownProvider(key.provider.to_string()))?;

        let refresh_token_plain = refresh_token.expose().to_string();
        let client_secret = config.client_secret.expose().to_string();
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token_plain.as_str()),
            ("client_id", config.client_id.as_str()),
            ("client_secret", client_secret.as_str()),
        ];

        let body = self.post_form(&config.token_url, &form).await?;
        let expires_at = body
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs as i64));

        Ok(RefreshedTokens {
            access_token: SecretString::new(body.access_token),
            refresh_token: body.refresh_token.map(SecretString::new),
            expires_at,
            scopes: body
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }
}
