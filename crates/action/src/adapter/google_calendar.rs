//! Google Calendar API adapter (`https://www.googleapis.com/calendar/v3`).
//!
//! Operations:
//! - `list_events` — `{ "calendar_id": str (default "primary"), "time_min": str?, "time_max": str? }`
//! - `get_event` — `{ "calendar_id": str (default "primary"), "event_id": str }`
//! - `create_event` — `{ "calendar_id": str (default "primary"), "summary": str, "start": str, "end": str }`
//! - `update_event` — `{ "calendar_id": str (default "primary"), "event_id": str, "summary": str? }`
//! - `delete_event` — `{ "calendar_id": str (default "primary"), "event_id": str }`

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

const BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar event CRUD.
pub struct GoogleCalendarAdapter {
    http: HttpClient,
    retry: RetryPolicy,
    credentials: Arc<dyn CredentialProvider>,
}

impl GoogleCalendarAdapter {
    /// Build the adapter.
    pub fn new(http: HttpClient, retry: RetryPolicy, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self { http, retry, credentials }
    }

    fn invalid(message: impl Into<String>) -> ToolCallResult {
        ToolCallResult::failure(nebula_error::NebulaError::invalid_input(message), 0)
    }

    fn calendar_id(params: &Value) -> String {
        params.get("calendar_id").and_then(Value::as_str).unwrap_or("primary").to_string()
    }
}

#[async_trait]
impl ToolAdapter for GoogleCalendarAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::from("google_calendar")
    }

    async fn call(&self, operation: &str, params: Value, credential: &CredentialKey) -> ToolCallResult {
        let calendar_id = Self::calendar_id(&params);

        let (method, path, body) = match operation {
            "list_events" => {
                let mut query = Vec::new();
                if let Some(v) = params.get("time_min").and_then(Value::as_str) {
                    query.push(format!("timeMin={v}"));
                }
                if let Some(v) = params.get("time_max").and_then(Value::as_str) {
                    query.push(format!("timeMax={v}"));
                }
                let suffix = if query.is_empty() { String::new() } else { format!("?{}", query.join("&")) };
                (RequestMethod::Get, format!("/calendars/{calendar_id}/events{suffix}"), None)
            }
            "get_event" => {
                let event_id = match params.get("event_id").and_then(Value::as_str) {
                    Some(id) => id,
                    None => return Self::invalid("missing required field `event_id`"),
                };
                (RequestMethod::Get, format!("/calendars/{calendar_id}/events/{event_id}"), None)
            }
            "create_event" => {
                let summary = params.get("summary").and_then(Value::as_str);
                let start = params.get("start").and_then(Value::as_str);
                let end = params.get("end").and_then(Value::as_str);
                let (summary, start, end) = match (summary, start, end) {
                    (Some(s), Some(st), Some(en)) => (s, st, en),
                    _ => return Self::invalid("create_event requires `summary`, `start`, and `end`"),
                };
                let body = serde_json::json!({
                    "summary": summary,
                    "start": { "dateTime": start },
                    "end": { "dateTime": end },
                });
                (RequestMethod::Post, format!("/calendars/{calendar_id}/events"), Some(body))
            }
            "update_event" => {
                let event_id = match params.get("event_id").and_then(Value::as_str) {
                    Some(id) => id,
                    None => return Self::invalid("missing required field `event_id`"),
                };
                let mut patch = serde_json::Map::new();
                if let Some(summary) = params.get("summary").and_then(Value::as_str) {
                    patch.insert("summary".to_string(), Value::String(summary.to_string()));
                }
                (RequestMethod::Patch, format!("/calendars/{calendar_id}/events/{event_id}"), Some(Value::Object(patch)))
            }
            "delete_event" => {
                let event_id = match params.get("event_id").and_then(Value::as_str) {
                    Some(id) => id,
                    None => return Self::invalid("missing required field `event_id`"),
                };
                (RequestMethod::Delete, format!("/calendars/{calendar_id}/events/{event_id}"), None)
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
            Ok((response, duration_ms)) => ToolCallResult::success(response.json.unwrap_or(Value::Null), duration_ms),
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
            Ok(AccessToken { token: "gc-token".to_string() })
        }

        async fn refresh(&self, _key: &CredentialKey) -> Result<AccessToken, nebula_error::NebulaError> {
            Ok(AccessToken { token: "gc-token".to_string() })
        }
    }

    #[tokio::test]
    async fn create_event_requires_start_and_end() {
        let adapter = GoogleCalendarAdapter::new(HttpClient::new().unwrap(), RetryPolicy::default(), Arc::new(StaticCredentials));
        let key = CredentialKey::new(UserId::v4(), "google_calendar", "default");
        let result = adapter.call("create_event", serde_json::json!({ "summary": "Standup" }), &key).await;
        assert!(!result.success);
    }

    #[tokio::test]
    async fn calendar_id_defaults_to_primary() {
        assert_eq!(GoogleCalendarAdapter::calendar_id(&serde_json::json!({})), "primary");
        assert_eq!(GoogleCalendarAdapter::calendar_id(&serde_json::json!({ "calendar_id": "team" })), "team");
    }
}
