//! Slack Web API adapter (`https://slack.com/api`).
//!
//! Operations:
//! - `post_message` — `{ "channel": str, "text": str }`
//! - `list_channels` — `{ "cursor": str? }`
//! - `get_user_info` — `{ "user": str }`
//!
//! Slack's API returns HTTP 200 with `{"ok": false, "error": "..."}` for
//! application-level failures rather than a non-2xx status, so
//! [`Self::into_tool_result`] inspects the body's `ok` field in addition
//! to the transport-level outcome.

use async_trait::async_trait;
use nebula_core::{CredentialKey, ProviderId};
use nebula_resilience::RetryPolicy;
use serde_json::Value;
use std::sync::Arc;

use super::credential::CredentialProvider;
use super::execute::execute_call;
use super::result::ToolCallResult;
use super::ToolAdapter;
use crate::http::{HttpClient, RequestAuth, RequestMethod, RequestOptions};

const BASE_URL: &str = "https://slack.com/api";

/// Slack messaging, channel listing, and user lookup.
pub struct SlackAdapter {
    http: HttpClient,
    retry: RetryPolicy,
    credentials: Arc<dyn CredentialProvider>,
}

impl SlackAdapter {
    /// Build the adapter.
    pub fn new(http: HttpClient, retry: RetryPolicy, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self { http, retry, credentials }
    }

    fn invalid(message: impl Into<String>) -> ToolCallResult {
        ToolCallResult::failure(nebula_error::NebulaError::invalid_input(message), 0)
    }

    fn into_tool_result(data: Value, duration_ms: u64) -> ToolCallResult {
        match data.get("ok").and_then(Value::as_bool) {
            Some(false) => {
                let reason = data.get("error").and_then(Value::as_str).unwrap_or("unknown_error");
                ToolCallResult::failure(nebula_error::NebulaError::upstream_permanent(format!("slack api error: {reason}")), duration_ms)
            }
            _ => ToolCallResult::success(data, duration_ms),
        }
    }
}

#[async_trait]
impl ToolAdapter for SlackAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::from("slack")
    }

    async fn call(&self, operation: &str, params: Value, credential: &CredentialKey) -> ToolCallResult {
        let (method, path, body) = match operation {
            "post_message" => {
                let channel = params.get("channel").and_then(Value::as_str);
                let text = params.get("text").and_then(Value::as_str);
                let (channel, text) = match (channel, text) {
                    (Some(c), Some(t)) => (c, t),
                    _ => return Self::invalid("post_message requires `channel` and `text`"),
                };
                (RequestMethod::Post, "/chat.postMessage".to_string(), Some(serde_json::json!({ "channel": channel, "text": text })))
            }
            "list_channels" => {
                let suffix = match params.get("cursor").and_then(Value::as_str) {
                    Some(cursor) => format!("?cursor={cursor}"),
                    None => String::new(),
                };
                (RequestMethod::Get, format!("/conversations.list{suffix}"), None)
            }
            "get_user_info" => {
                let user = match params.get("user").and_then(Value::as_str) {
                    Some(user) => user,
                    None => return Self::invalid("missing required field `user`"),
                };
                (RequestMethod::Get, format!("/users.info?user={user}"), None)
            }
            other => return Self::invalid(format!("unknown operation `{other}`")),
        };

        let result = execute_call(&self.http, &self.retry, self.credentials.as_ref(), credential, |token| {
            let mut builder = RequestOptions::builder().base_url(BASE_URL).url(path.clone()).method(method).auth(RequestAuth::bearer(token));
            if let Some(body) = &body {
                builder = builder.json(body)?;
            }
            builder.build()
        })
        .await;

        match result {
            Ok((response, duration_ms)) => Self::into_tool_result(response.json.unwrap_or(Value::Null), duration_ms),
            Err(err) => ToolCallResult::failure(err.into(), 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use nebula_core::UserId;

    use super::*;
    use crate::adapter::credential::AccessToken;

    struct StaticCredentials;

    #[async_trait]
    impl CredentialProvider for StaticCredentials {
        async fn access_token(&self, _key: &CredentialKey) -> Result<AccessToken, nebula_error::NebulaError> {
            Ok(AccessToken { token: "xoxb-token".to_string() })
        }

        async fn refresh(&self, _key: &CredentialKey) -> Result<AccessToken, nebula_error::NebulaError> {
            Ok(AccessToken { token: "xoxb-token".to_string() })
        }
    }

    #[tokio::test]
    async fn post_message_requires_channel_and_text() {
        let adapter = SlackAdapter::new(HttpClient::new().unwrap(), RetryPolicy::default(), Arc::new(StaticCredentials));
        let key = CredentialKey::new(UserId::v4(), "slack", "default");
        let result = adapter.call("post_message", serde_json::json!({ "channel": "#general" }), &key).await;
        assert!(!result.success);
    }

    #[test]
    fn application_level_failure_is_surfaced_as_a_tool_error_despite_http_200() {
        let result = SlackAdapter::into_tool_result(serde_json::json!({ "ok": false, "error": "channel_not_found" }), 10);
        assert!(!result.success);
    }

    #[test]
    fn application_level_success_passes_through() {
        let result = SlackAdapter::into_tool_result(serde_json::json!({ "ok": true, "ts": "123.45" }), 10);
        assert!(result.success);
    }
}
