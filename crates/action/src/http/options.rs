//! Request options and a hand-rolled owned-pattern builder for them.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use super::auth::RequestAuth;
use super::error::RequestError;
use super::method::RequestMethod;

/// Connect timeout for one attempt (spec default).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Read timeout for one attempt (spec default).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
/// Total wall-clock timeout for one attempt (spec default).
pub const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::from_secs(30);
/// Response body size cap; exceeding it is a hard error, not a silent
/// truncation.
pub const DEFAULT_MAX_RESPONSE_BYTES: u64 = 10 * 1024 * 1024;

/// Everything needed to build and send one HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// Path or full URL. Joined with `base_url` if both are set.
    pub url: Option<String>,
    /// Base URL a relative `url` is resolved against.
    pub base_url: Option<String>,
    /// HTTP method.
    pub method: RequestMethod,
    /// Authentication to apply.
    pub auth: RequestAuth,
    /// Extra request headers.
    pub headers: HashMap<String, String>,
    /// Query string parameters.
    pub query_params: HashMap<String, String>,
    /// Raw JSON body.
    pub json: Option<Value>,
    /// `User-Agent` header override.
    pub user_agent: Option<String>,
    /// Connect timeout for this attempt.
    pub connect_timeout: Duration,
    /// Read timeout for this attempt.
    pub read_timeout: Duration,
    /// Total wall-clock timeout for this attempt.
    pub total_timeout: Duration,
    /// Response body size cap in bytes.
    pub max_response_bytes: u64,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            url: None,
            base_url: None,
            method: RequestMethod::default(),
            auth: RequestAuth::None,
            headers: HashMap::new(),
            query_params: HashMap::new(),
            json: None,
            user_agent: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            total_timeout: DEFAULT_TOTAL_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl RequestOptions {
    /// Start building options with an owned, chained-setter builder.
    pub fn builder() -> RequestOptionsBuilder {
        RequestOptionsBuilder::default()
    }

    /// The URL to actually dial: `base_url` joined with `url`, or
    /// whichever of the two is set.
    pub fn full_url(&self) -> Option<String> {
        match (&self.base_url, &self.url) {
            (Some(base), Some(path)) => Some(format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))),
            (Some(base), None) => Some(base.clone()),
            (None, Some(url)) => Some(url.clone()),
            (None, None) => None,
        }
    }
}

/// Owned-pattern builder for [`RequestOptions`] (mirrors the shape of a
/// `derive_builder`-style API without depending on the crate).
#[derive(Debug, Clone, Default)]
pub struct RequestOptionsBuilder {
    options: RequestOptions,
}

impl RequestOptionsBuilder {
    /// Set the request URL (path or full URL).
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.options.url = Some(url.into());
        self
    }

    /// Set the base URL a relative `url` resolves against.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.options.base_url = Some(base_url.into());
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: RequestMethod) -> Self {
        self.options.method = method;
        self
    }

    /// Set the authentication method.
    pub fn auth(mut self, auth: RequestAuth) -> Self {
        self.options.auth = auth;
        self
    }

    /// Add a single header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.headers.insert(key.into(), value.into());
        self
    }

    /// Add a single query parameter.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.query_params.insert(key.into(), value.into());
        self
    }

    /// Set a JSON body from any `Serialize` value.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, RequestError> {
        self.options.json = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    /// Override the per-attempt total timeout.
    pub fn total_timeout(mut self, timeout: Duration) -> Self {
        self.options.total_timeout = timeout;
        self
    }

    /// Finish building.
    pub fn build(mut self) -> Result<RequestOptions, RequestError> {
        self.options.auth.clone().apply(&mut self.options);
        if self.options.full_url().is_none() {
            return Err(RequestError::InvalidUrl("no url or base_url provided".to_string()));
        }
        Ok(self.options)
    }
}
