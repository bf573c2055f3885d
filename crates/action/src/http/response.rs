//! The normalized response shape every adapter operation works with.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::RequestError;

/// Coarse classification of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatusCategory {
    /// 1xx.
    Informational,
    /// 2xx.
    Success,
    /// 3xx.
    Redirection,
    /// 4xx.
    ClientError,
    /// 5xx.
    ServerError,
}

/// A completed HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, lower-cased keys.
    pub headers: HashMap<String, String>,
    /// Body parsed as JSON, if the content type indicated JSON and
    /// parsing succeeded.
    pub json: Option<Value>,
    /// Raw response body bytes.
    pub bytes: Vec<u8>,
    /// Final URL (after redirects).
    pub url: String,
    /// Wall-clock time spent on the attempt that produced this response.
    pub duration_ms: u64,
}

impl Response {
    /// Status category per [`ResponseStatusCategory`].
    pub fn status_category(&self) -> ResponseStatusCategory {
        match self.status {
            100..=199 => ResponseStatusCategory::Informational,
            200..=299 => ResponseStatusCategory::Success,
            300..=399 => ResponseStatusCategory::Redirection,
            400..=499 => ResponseStatusCategory::ClientError,
            _ => ResponseStatusCategory::ServerError,
        }
    }

    /// `true` for 2xx.
    pub fn is_success(&self) -> bool {
        self.status_category() == ResponseStatusCategory::Success
    }

    /// Header lookup, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        let needle = name.to_ascii_lowercase();
        self.headers.iter().find(|(k, _)| k.to_ascii_lowercase() == needle).map(|(_, v)| v.as_str())
    }

    /// Response body as text (best-effort UTF-8).
    pub fn text(&self) -> Result<String, RequestError> {
        String::from_utf8(self.bytes.clone()).map_err(|e| RequestError::Other(format!("response body is not valid UTF-8: {e}")))
    }

    /// Deserialize the JSON body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, RequestError> {
        match &self.json {
            Some(value) => serde_json::from_value(value.clone()).map_err(RequestError::from),
            None => serde_json::from_slice(&self.bytes).map_err(RequestError::from),
        }
    }

    /// Turn a non-2xx response into an [`RequestError::Http`], carrying a
    /// parsed `Retry-After` if present.
    pub fn into_result(self) -> Result<Self, RequestError> {
        if self.is_success() {
            return Ok(self);
        }
        let retry_after = self.header("retry-after").and_then(parse_retry_after);
        let message = self.text().unwrap_or_else(|_| format!("HTTP {}", self.status));
        Err(RequestError::Http { status: self.status, message, retry_after })
    }
}

/// Parses a `Retry-After` header value: either delay-seconds or an
/// HTTP-date (RFC 7231 §7.1.3). Only the delay-seconds form is supported
/// here; an HTTP-date value is treated as absent rather than
/// misinterpreted.
fn parse_retry_after(value: &str) -> Option<std::time::Duration> {
    value.trim().parse::<u64>().ok().map(std::time::Duration::from_secs)
}
