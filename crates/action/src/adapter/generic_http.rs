//! A generic HTTP tool adapter for upstream APIs with no dedicated
//! adapter, authenticated through a stored credential rather than a
//! caller-supplied token.

use async_trait::async_trait;
use nebula_core::{CredentialKey, ProviderId};
use nebula_resilience::RetryPolicy;
use serde_json::Value;

use super::credential::CredentialProvider;
use super::execute::execute_call;
use super::result::ToolCallResult;
use super::ToolAdapter;
use crate::http::{HttpClient, RequestAuth, RequestMethod, RequestOptions};

/// Where the resolved credential secret is placed on the outgoing
/// request. Mirrors the three auth modes the generic adapter supports:
/// bearer, api-key (header or query, under a configurable name), and
/// basic (secret used as the password, empty username).
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AuthPlacement {
    /// `Authorization: Bearer <secret>`.
    Bearer,
    /// API key in a header under `name`.
    ApiKeyHeader {
        /// Header name to carry the key.
        name: String,
    },
    /// API key in a query parameter under `name`.
    ApiKeyQuery {
        /// Query parameter name to carry the key.
        name: String,
    },
    /// HTTP basic auth with the secret as the password.
    Basic,
}

/// Parameters for the adapter's one operation, `request`.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RequestParams {
    /// Absolute or base-relative URL.
    pub url: String,
    /// HTTP method, defaulting to `GET`.
    #[serde(default)]
    pub method: Option<String>,
    /// Extra headers beyond the auth header.
    #[serde(default)]
    pub headers: std::collections::HashMap<String, String>,
    /// Query parameters beyond the auth query param.
    #[serde(default)]
    pub query: std::collections::HashMap<String, String>,
    /// Optional JSON request body.
    #[serde(default)]
    pub json: Option<Value>,
    /// Where to place the resolved credential secret.
    pub auth: AuthPlacement,
}

/// Calls any HTTP API, placing a stored credential's secret per the
/// caller's chosen [`AuthPlacement`].
pub struct GenericHttpAdapter {
    http: HttpClient,
    retry: RetryPolicy,
    credentials: std::sync::Arc<dyn CredentialProvider>,
    provider: ProviderId,
}

impl GenericHttpAdapter {
    /// Build the adapter for one provider identity.
    pub fn new(http: HttpClient, retry: RetryPolicy, credentials: std::sync::Arc<dyn CredentialProvider>, provider: ProviderId) -> Self {
        Self { http, retry, credentials, provider }
    }
}

#[async_trait]
impl ToolAdapter for GenericHttpAdapter {
    fn provider(&self) -> ProviderId {
        self.provider.clone()
    }

    async fn call(&self, operation: &str, params: Value, credential: &CredentialKey) -> ToolCallResult {
        if operation != "request" {
            return ToolCallResult::failure(nebula_error::NebulaError::invalid_input(format!("unknown operation `{operation}`")), 0);
        }

        let params: RequestParams = match serde_json::from_value(params) {
            Ok(params) => params,
            Err(err) => return ToolCallResult::failure(nebula_error::NebulaError::invalid_input(err.to_string()), 0),
        };

        let method = match params.method.as_deref().map(str::parse::<RequestMethod>).transpose() {
            Ok(method) => method.unwrap_or_default(),
            Err(err) => return ToolCallResult::failure(nebula_error::NebulaError::invalid_input(err), 0),
        };

        let result = execute_call(&self.http, &self.retry, self.credentials.as_ref(), credential, |token| {
            let auth = match &params.auth {
                AuthPlacement::Bearer => RequestAuth::bearer(token),
                AuthPlacement::ApiKeyHeader { name } => RequestAuth::api_key_header(name.clone(), token),
                AuthPlacement::ApiKeyQuery { name } => RequestAuth::api_key_query(name.clone(), token),
                AuthPlacement::Basic => RequestAuth::basic(String::new(), token.to_string()),
            };
            let mut builder = RequestOptions::builder().url(params.url.clone()).method(method).auth(auth);
            for (key, value) in &params.headers {
                builder = builder.header(key.clone(), value.clone());
            }
            for (key, value) in &params.query {
                builder = builder.query_param(key.clone(), value.clone());
            }
            if let Some(body) = &params.json {
                builder = builder.json(body)?;
            }
            builder.build()
        })
        .await;

        match result {
            Ok((response, duration_ms)) => ToolCallResult::success(response.json.unwrap_or(Value::Null), duration_ms),
            Err(err) => ToolCallResult::failure(err.into(), 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use nebula_core::UserId;

    use super::*;
    use crate::adapter::credential::AccessToken;

    struct StaticCredentials;

    #[async_trait]
    impl CredentialProvider for StaticCredentials {
        async fn access_token(&self, _key: &CredentialKey) -> Result<AccessToken, nebula_error::NebulaError> {
            Ok(AccessToken { token: "secret".to_string() })
        }

        async fn refresh(&self, _key: &CredentialKey) -> Result<AccessToken, nebula_error::NebulaError> {
            Ok(AccessToken { token: "secret".to_string() })
        }
    }

    #[tokio::test]
    async fn unknown_operation_fails_before_any_network_call() {
        let adapter = GenericHttpAdapter::new(HttpClient::new().unwrap(), RetryPolicy::default(), Arc::new(StaticCredentials), ProviderId::from("custom"));
        let key = CredentialKey::new(UserId::v4(), "custom", "default");
        let result = adapter.call("delete_everything", Value::Null, &key).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn bearer_request_against_a_mock_server() {
        let mock = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::header("Authorization", "Bearer secret"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&mock)
            .await;

        let adapter = GenericHttpAdapter::new(HttpClient::new().unwrap(), RetryPolicy::default(), Arc::new(StaticCredentials), ProviderId::from("custom"));
        let key = CredentialKey::new(UserId::v4(), "custom", "default");
        let params = serde_json::json!({ "url": mock.uri(), "auth": { "mode": "bearer" } });
        let result = adapter.call("request", params, &key).await;
        assert!(result.success);
    }
}
