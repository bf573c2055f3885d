//! Short-TTL, single-use CSRF state tokens for the authorization-code flow.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use nebula_core::{ProviderId, UserId};
use url::Url;

use crate::crypto::generate_random_state;
use crate::error::CredentialError;

/// An opaque, single-use OAuth2 CSRF state token with at least 128 bits
/// of entropy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateToken(String);

impl StateToken {
    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(generate_random_state())
    }

    /// The token's string form, as embedded in the authorization URL and
    /// echoed back by the provider on callback.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StateToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for StateToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What `begin_authorization` remembers about a pending authorization
/// request, keyed by its [`StateToken`].
#[derive(Debug, Clone)]
pub struct OAuth2StateRecord {
    /// The user who started the flow.
    pub user_id: UserId,
    /// The provider being authorized.
    pub provider: ProviderId,
    /// Scopes requested.
    pub requested_scopes: Vec<String>,
    /// Where the provider should redirect after the user approves.
    pub redirect_uri: Url,
    /// The PKCE code verifier, if this provider uses PKCE. Needed again
    /// at `complete_authorization` to send alongside the authorization
    /// code.
    pub pkce_verifier: Option<String>,
}

struct Entry {
    record: OAuth2StateRecord,
    expires_at: Instant,
}

/// A short-TTL key-value store for [`OAuth2StateRecord`]s: single-use
/// (read-and-delete), with expiry enforced both lazily (on lookup) and by
/// an eager sweep the caller can run periodically to bound memory held by
/// abandoned flows.
pub struct OAuth2StateStore {
    entries: DashMap<StateToken, Entry>,
    ttl: Duration,
}

impl Default for OAuth2StateStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(1800))
    }
}

impl OAuth2StateStore {
    /// Build a store with the given TTL (spec default: 1800s /
    /// `oauth2_state_ttl_seconds`).
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Record a new pending authorization, returning its state token.
    #[must_use]
    pub fn insert(&self, record: OAuth2StateRecord) -> StateToken {
        let token = StateToken::generate();
        self.entries.insert(
            token.clone(),
            Entry {
                record,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// Atomically consume the record for `token`: returns it exactly once,
    /// and only if it exists and has not expired. A second call with the
    /// same token (replay, or the provider double-firing the callback)
    /// always gets [`CredentialError::InvalidState`].
    pub fn consume(&self, token: &StateToken) -> Result<OAuth2StateRecord, CredentialError> {
        let (_, entry) = self
            .entries
            .remove(token)
            .ok_or(CredentialError::InvalidState)?;
        if entry.expires_at <= Instant::now() {
            return Err(CredentialError::InvalidState);
        }
        Ok(entry.record)
    }

    /// Drop every entry whose TTL has elapsed. Lookups already enforce
    /// expiry lazily; this only bounds memory for flows the user never
    /// completes, and should be called on a periodic timer.
    pub fn sweep_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    /// Number of entries currently held, expired or not (for tests /
    /// metrics).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
