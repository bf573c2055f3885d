//! Authentication methods attachable to an outgoing [`super::RequestOptions`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::options::RequestOptions;

/// Authentication for one outgoing HTTP call.
///
/// OAuth2 bearer tokens are not a variant here: credential resolution
/// happens through the [`crate::credential::CredentialProvider`] port
/// before a request is built, and the resolved access token is applied as
/// [`RequestAuth::Bearer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestAuth {
    /// HTTP Basic authentication.
    Basic {
        /// Username for authentication.
        username: String,
        /// Password for authentication.
        password: String,
    },
    /// Bearer token in the `Authorization` header.
    Bearer {
        /// Token value.
        token: String,
    },
    /// API key sent as a request header.
    ApiKeyHeader {
        /// Header name.
        key: String,
        /// Header value.
        value: String,
    },
    /// API key sent as a query parameter.
    ApiKeyQuery {
        /// Query parameter name.
        key: String,
        /// Query parameter value.
        value: String,
    },
    /// No authentication.
    None,
}

impl RequestAuth {
    /// Basic authentication from a username/password pair.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic { username: username.into(), password: password.into() }
    }

    /// Bearer token authentication.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer { token: token.into() }
    }

    /// API key carried in a request header.
    pub fn api_key_header(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ApiKeyHeader { key: key.into(), value: value.into() }
    }

    /// API key carried in the query string.
    pub fn api_key_query(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ApiKeyQuery { key: key.into(), value: value.into() }
    }

    /// Applies this auth method to `options`, adding headers or query
    /// parameters as appropriate.
    pub fn apply(&self, options: &mut RequestOptions) {
        match self {
            Self::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                options.headers.insert("Authorization".to_string(), format!("Basic {encoded}"));
            }
            Self::Bearer { token } => {
                options.headers.insert("Authorization".to_string(), format!("Bearer {token}"));
            }
            Self::ApiKeyHeader { key, value } => {
                options.headers.insert(key.clone(), value.clone());
            }
            Self::ApiKeyQuery { key, value } => {
                options.query_params.insert(key.clone(), value.clone());
            }
            Self::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_sets_base64_header() {
        let mut options = RequestOptions::default();
        RequestAuth::basic("alice", "secret").apply(&mut options);
        assert_eq!(options.headers.get("Authorization").unwrap(), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn bearer_auth_sets_header() {
        let mut options = RequestOptions::default();
        RequestAuth::bearer("tok123").apply(&mut options);
        assert_eq!(options.headers.get("Authorization").unwrap(), "Bearer tok123");
    }

    #[test]
    fn api_key_query_sets_query_param_not_header() {
        let mut options = RequestOptions::default();
        RequestAuth::api_key_query("api_key", "xyz").apply(&mut options);
        assert_eq!(options.query_params.get("api_key").unwrap(), "xyz");
        assert!(!options.headers.contains_key("api_key"));
    }

    #[test]
    fn none_auth_is_a_no_op() {
        let mut options = RequestOptions::default();
        RequestAuth::None.apply(&mut options);
        assert!(options.headers.is_empty());
    }
}
