//! Encrypted credential storage: `(user, provider, integration) →` OAuth2
//! material, with per-row serialized refresh.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use nebula_core::CredentialKey;
use nebula_schema::SecretString;
use tokio::sync::Mutex;

use crate::audit::{AuditAction, AuditContext, AuditOutcome, AuditRecord, AuditSink, TracingAuditSink};
use crate::crypto::{self, EncryptedData, EncryptionKey};
use crate::error::CredentialError;

const ACCESS_TOKEN_LABEL: &[u8] = b"access_token";
const REFRESH_TOKEN_LABEL: &[u8] = b"refresh_token";

/// Plaintext OAuth2 credential material, as handed to a caller by
/// [`CredentialStore::get`]/[`CredentialStore::refresh`]. Never logged or
/// persisted as-is; `access_token`/`refresh_token` are
/// [`SecretString`]s whose `Debug`/`Display` redact.
#[derive(Debug, Clone)]
pub struct OAuth2Credential {
    /// The `(user, provider, integration)` this credential belongs to.
    pub key: CredentialKey,
    /// Current access token.
    pub access_token: SecretString,
    /// Refresh token, if the provider issued one.
    pub refresh_token: Option<SecretString>,
    /// Token type, usually `"Bearer"`.
    pub token_type: String,
    /// When `access_token` expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
    /// Scopes the token was granted.
    pub scopes: Vec<String>,
    /// When this credential was first stored.
    pub created_at: DateTime<Utc>,
    /// When this credential was last updated (store or successful refresh).
    pub updated_at: DateTime<Utc>,
    /// When this credential was last read via `get`.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Monotonically increasing version, bumped on every refresh. Used by
    /// [`CredentialStore::refresh`] to detect a refresh that already
    /// happened concurrently.
    pub version: u64,
}

/// The material a caller supplies to [`CredentialStore::store`] for a new
/// or replaced credential.
#[derive(Debug, Clone)]
pub struct NewOAuth2Credential {
    /// Access token.
    pub access_token: SecretString,
    /// Refresh token, if any.
    pub refresh_token: Option<SecretString>,
    /// Token type, usually `"Bearer"`.
    pub token_type: String,
    /// When `access_token` expires, if known.
    pub expires_at: Option<DateTime<Utc>>,
    /// Scopes the token was granted.
    pub scopes: Vec<String>,
}

/// The result of a successful provider token refresh, as produced by a
/// [`TokenRefresher`].
#[derive(Debug, Clone)]
pub struct RefreshedTokens {
    /// The new access token.
    pub access_token: SecretString,
    /// A new refresh token, if the provider rotates them (some do).
    /// `None` means keep the existing one.
    pub refresh_token: Option<SecretString>,
    /// When the new access token expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Scopes granted to the new token (providers may narrow on refresh).
    pub scopes: Vec<String>,
}

/// Performs the actual network call to a provider's token endpoint.
/// Implemented over `reqwest` in [`crate::oauth2::flow`] (behind the
/// `oauth2-http` feature); kept as a trait here so the store has no
/// compile-time HTTP dependency and tests can supply a fake.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Exchange `refresh_token` at the provider's token endpoint for a new
    /// access token.
    async fn refresh_token(
        &self,
        key: &CredentialKey,
        refresh_token: &SecretString,
    ) -> Result<RefreshedTokens, CredentialError>;
}

#[derive(Debug, Clone)]
struct StoredRow {
    encrypted_access_token: EncryptedData,
    encrypted_refresh_token: Option<EncryptedData>,
    token_type: String,
    expires_at: Option<DateTime<Utc>>,
    scopes: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_used_at: Option<DateTime<Utc>>,
    version: u64,
    valid: bool,
}

/// Non-secret metadata about a stored credential, as returned by
/// [`CredentialStore::list_for_user`]. Never carries token material.
#[derive(Debug, Clone)]
pub struct CredentialSummary {
    /// The `(user, provider, integration)` this row belongs to.
    pub key: CredentialKey,
    /// Scopes the current token was granted.
    pub scopes: Vec<String>,
    /// When this credential was first stored.
    pub created_at: DateTime<Utc>,
    /// When this credential was last updated (store or successful refresh).
    pub updated_at: DateTime<Utc>,
    /// Whether the row is currently usable (a failed refresh clears this).
    pub valid: bool,
}

/// Persisted `(user, provider, integration) →` encrypted OAuth2 material.
///
/// All operations are keyed by [`CredentialKey`]; `get` and `refresh`
/// refuse to cross the user boundary because the key itself embeds the
/// user id, so there is no way to look up another user's row by accident.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Encrypt and upsert a credential row, emitting a `store` audit
    /// record.
    async fn store(
        &self,
        key: &CredentialKey,
        cred: NewOAuth2Credential,
        ctx: &AuditContext,
    ) -> Result<(), CredentialError>;

    /// Return the decrypted credential, updating `last_used_at`.
    ///
    /// # Errors
    /// [`CredentialError::NotFound`] if no row exists; [`CredentialError::Invalid`]
    /// if a prior refresh marked the row unusable.
    async fn get(
        &self,
        key: &CredentialKey,
        ctx: &AuditContext,
    ) -> Result<OAuth2Credential, CredentialError>;

    /// Refresh the credential at `key`.
    ///
    /// `known_version` is the version the caller last observed (typically
    /// from the credential whose use just failed with a 401). If the
    /// stored version has already moved past it — another concurrent
    /// refresher won the row lock first — the fresh value is returned
    /// without a second provider call. Otherwise `refresher` is invoked
    /// and the result replaces both ciphertexts.
    async fn refresh(
        &self,
        key: &CredentialKey,
        known_version: u64,
        refresher: &dyn TokenRefresher,
        ctx: &AuditContext,
    ) -> Result<OAuth2Credential, CredentialError>;

    /// Remove the credential, emitting a `revoke` audit record.
    async fn revoke(&self, key: &CredentialKey, ctx: &AuditContext) -> Result<(), CredentialError>;

    /// List non-secret metadata for every credential stored for `user_id`,
    /// across all providers and integrations.
    async fn list_for_user(&self, user_id: nebula_core::UserId) -> Vec<CredentialSummary>;
}

/// An in-memory [`CredentialStore`]. Rows never outlive the process; used
/// for tests and for deployments that delegate real persistence to an
/// external secret manager behind a different `CredentialStore` impl.
pub struct InMemoryCredentialStore<A: AuditSink = TracingAuditSink> {
    key: EncryptionKey,
    rows: DashMap<CredentialKey, Arc<Mutex<StoredRow>>>,
    audit: A,
}

impl InMemoryCredentialStore<TracingAuditSink> {
    /// Build a store whose encryption key is derived from
    /// `deployment_secret`, auditing through `tracing`.
    pub fn new(deployment_secret: &str) -> Result<Self, CredentialError> {
        Self::with_audit_sink(deployment_secret, TracingAuditSink)
    }
}

impl<A: AuditSink> InMemoryCredentialStore<A> {
    /// Build a store with a custom [`AuditSink`] (e.g. one that persists
    /// to the `audit` table rather than only `tracing`).
    pub fn with_audit_sink(deployment_secret: &str, audit: A) -> Result<Self, CredentialError> {
        Ok(Self {
            key: EncryptionKey::derive(deployment_secret)?,
            rows: DashMap::new(),
            audit,
        })
    }

    fn decrypt_row(&self, key: &CredentialKey, row: &StoredRow) -> Result<OAuth2Credential, CredentialError> {
        let access_token = SecretString::new(String::from_utf8(crypto::decrypt(
            &self.key,
            ACCESS_TOKEN_LABEL,
            &row.encrypted_access_token,
        )?).map_err(|e| CredentialError::Crypto(e.to_string()))?);

        let refresh_token = row
            .encrypted_refresh_token
            .as_ref()
            .map(|enc| -> Result<SecretString, CredentialError> {
                let bytes = crypto::decrypt(&self.key, REFRESH_TOKEN_LABEL, enc)?;
                Ok(SecretString::new(
                    String::from_utf8(bytes).map_err(|e| CredentialError::Crypto(e.to_string()))?,
                ))
            })
            .transpose()?;

        Ok(OAuth2Credential {
            key: key.clone(),
            access_token,
            refresh_token,
            token_type: row.token_type.clone(),
            expires_at: row.expires_at,
            scopes: row.scopes.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_used_at: row.last_used_at,
            version: row.version,
        })
    }
}

#[async_trait]
impl<A: AuditSink> CredentialStore for InMemoryCredentialStore<A> {
    async fn store(
        &self,
        key: &CredentialKey,
        cred: NewOAuth2Credential,
        ctx: &AuditContext,
    ) -> Result<(), CredentialError> {
        let encrypted_access_token =
            crypto::encrypt(&self.key, ACCESS_TOKEN_LABEL, cred.access_token.expose().as_bytes());
        let encrypted_refresh_token = cred
            .refresh_token
            .as_ref()
            .map(|t| crypto::encrypt(&self.key, REFRESH_TOKEN_LABEL, t.expose().as_bytes()))
            .transpose();

        let (encrypted_access_token, encrypted_refresh_token) =
            match (encrypted_access_token, encrypted_refresh_token) {
                (Ok(a), Ok(r)) => (a, r),
                (Err(e), _) | (_, Err(e)) => {
                    self.audit.record(AuditRecord {
                        actor_user: ctx.actor_user,
                        action: AuditAction::Store,
                        provider: key.provider.clone(),
                        outcome: AuditOutcome::Failure(e.to_string()),
                        timestamp: Utc::now(),
                        correlation_id: ctx.correlation_id,
                    });
                    return Err(e);
                }
            };

        let now = Utc::now();
        let existing_created_at = self
            .rows
            .get(key)
            .map(|r| r.try_lock().map(|row| row.created_at).ok())
            .flatten();

        let row = StoredRow {
            encrypted_access_token,
            encrypted_refresh_token,
            token_type: cred.token_type,
            expires_at: cred.expires_at,
            scopes: cred.scopes,
            created_at: existing_created_at.unwrap_or(now),
            updated_at: now,
            last_used_at: None,
            version: 1,
            valid: true,
        };
        self.rows.insert(key.clone(), Arc::new(Mutex::new(row)));

        self.audit.record(AuditRecord {
            actor_user: ctx.actor_user,
            action: AuditAction::Store,
            provider: key.provider.clone(),
            outcome: AuditOutcome::Success,
            timestamp: now,
            correlation_id: ctx.correlation_id,
        });
        Ok(())
    }

    async fn get(
        &self,
        key: &CredentialKey,
        ctx: &AuditContext,
    ) -> Result<OAuth2Credential, CredentialError> {
        let row_arc = self
            .rows
            .get(key)
            .map(|r| r.clone())
            .ok_or_else(|| CredentialError::NotFound(key.to_string()))?;

        let mut row = row_arc.lock().await;
        if !row.valid {
            self.audit.record(AuditRecord {
                actor_user: ctx.actor_user,
                action: AuditAction::Use,
                provider: key.provider.clone(),
                outcome: AuditOutcome::Failure("credential invalid".into()),
                timestamp: Utc::now(),
                correlation_id: ctx.correlation_id,
            });
            return Err(CredentialError::Invalid(key.to_string()));
        }

        row.last_used_at = Some(Utc::now());
        let result = self.decrypt_row(key, &row);

        self.audit.record(AuditRecord {
            actor_user: ctx.actor_user,
            action: AuditAction::Use,
            provider: key.provider.clone(),
            outcome: match &result {
                Ok(_) => AuditOutcome::Success,
                Err(e) => AuditOutcome::Failure(e.to_string()),
            },
            timestamp: Utc::now(),
            correlation_id: ctx.correlation_id,
        });

        result
    }

    async fn refresh(
        &self,
        key: &CredentialKey,
        known_version: u64,
        refresher: &dyn TokenRefresher,
        ctx: &AuditContext,
    ) -> Result<OAuth2Credential, CredentialError> {
        let row_arc = self
            .rows
            .get(key)
            .map(|r| r.clone())
            .ok_or_else(|| CredentialError::NotFound(key.to_string()))?;

        let mut row = row_arc.lock().await;

        if row.version != known_version {
            // Another concurrent refresher already rotated the token while
            // we were waiting for the row lock.
            return self.decrypt_row(key, &row);
        }
        if !row.valid {
            return Err(CredentialError::Invalid(key.to_string()));
        }

        let current_refresh_token = row
            .encrypted_refresh_token
            .as_ref()
            .map(|enc| crypto::decrypt(&self.key, REFRESH_TOKEN_LABEL, enc))
            .transpose()?
            .map(|bytes| String::from_utf8(bytes).map_err(|e| CredentialError::Crypto(e.to_string())))
            .transpose()?
            .map(SecretString::new)
            .ok_or_else(|| CredentialError::Invalid(key.to_string()))?;

        match refresher.refresh_token(key, &current_refresh_token).await {
            Ok(new_tokens) => {
                row.encrypted_access_token = crypto::encrypt(
                    &self.key,
                    ACCESS_TOKEN_LABEL,
                    new_tokens.access_token.expose().as_bytes(),
                )?;
                if let Some(new_refresh) = &new_tokens.refresh_token {
                    row.encrypted_refresh_token = Some(crypto::encrypt(
                        &self.key,
                        REFRESH_TOKEN_LABEL,
                        new_refresh.expose().as_bytes(),
                    )?);
                }
                row.expires_at = new_tokens.expires_at;
                if !new_tokens.scopes.is_empty() {
                    row.scopes = new_tokens.scopes;
                }
                row.updated_at = Utc::now();
                row.version += 1;
                row.valid = true;

                self.audit.record(AuditRecord {
                    actor_user: ctx.actor_user,
                    action: AuditAction::Refresh,
                    provider: key.provider.clone(),
                    outcome: AuditOutcome::Success,
                    timestamp: row.updated_at,
                    correlation_id: ctx.correlation_id,
                });

                self.decrypt_row(key, &row)
            }
            Err(e) => {
                row.valid = false;
                self.audit.record(AuditRecord {
                    actor_user: ctx.actor_user,
                    action: AuditAction::Refresh,
                    provider: key.provider.clone(),
                    outcome: AuditOutcome::Failure(e.to_string()),
                    timestamp: Utc::now(),
                    correlation_id: ctx.correlation_id,
                });
                Err(CredentialError::Invalid(key.to_string()))
            }
        }
    }

    async fn revoke(&self, key: &CredentialKey, ctx: &AuditContext) -> Result<(), CredentialError> {
        self.rows
            .remove(key)
            .ok_or_else(|| CredentialError::NotFound(key.to_string()))?;
        self.audit.record(AuditRecord {
            actor_user: ctx.actor_user,
            action: AuditAction::Revoke,
            provider: key.provider.clone(),
            outcome: AuditOutcome::Success,
            timestamp: Utc::now(),
            correlation_id: ctx.correlation_id,
        });
        Ok(())
    }

    async fn list_for_user(&self, user_id: nebula_core::UserId) -> Vec<CredentialSummary> {
        let mut summaries = Vec::new();
        for entry in self.rows.iter() {
            if entry.key().user_id != user_id {
                continue;
            }
            let row = entry.value().lock().await;
            summaries.push(CredentialSummary {
                key: entry.key().clone(),
                scopes: row.scopes.clone(),
                created_at: row.created_at,
                updated_at: row.updated_at,
                valid: row.valid,
            });
        }
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_core::UserId;

    fn key() -> CredentialKey {
        CredentialKey::new(UserId::v4(), "slack", "default")
    }

    fn new_cred(token: &str) -> NewOAuth2Credential {
        NewOAuth2Credential {
            access_token: SecretString::new(token),
            refresh_token: Some(SecretString::new("refresh-1")),
            token_type: "Bearer".into(),
            expires_at: None,
            scopes: vec!["chat:write".into()],
        }
    }

    struct StaticRefresher;
    #[async_trait]
    impl TokenRefresher for StaticRefresher {
        async fn refresh_token(
            &self,
            _key: &CredentialKey,
            _refresh_token: &SecretString,
        ) -> Result<RefreshedTokens, CredentialError> {
            Ok(RefreshedTokens {
                access_token: SecretString::new("refreshed-access"),
                refresh_token: None,
                expires_at: None,
                scopes: vec![],
            })
        }
    }

    #[tokio::test]
    async fn store_then_get_roundtrips_plaintext() {
        let store = InMemoryCredentialStore::new("s").unwrap();
        let key = key();
        let ctx = AuditContext::new(key.user_id);
        store.store(&key, new_cred("access-1"), &ctx).await.unwrap();

        let cred = store.get(&key, &ctx).await.unwrap();
        assert_eq!(cred.access_token, SecretString::new("access-1"));
        assert!(cred.last_used_at.is_some());
    }

    #[tokio::test]
    async fn get_refuses_cross_user() {
        let store = InMemoryCredentialStore::new("s").unwrap();
        let key_a = key();
        let ctx_a = AuditContext::new(key_a.user_id);
        store.store(&key_a, new_cred("access-1"), &ctx_a).await.unwrap();

        let other_key = CredentialKey::new(UserId::v4(), "slack", "default");
        let ctx_b = AuditContext::new(other_key.user_id);
        assert!(matches!(
            store.get(&other_key, &ctx_b).await,
            Err(CredentialError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn refresh_rotates_access_token() {
        let store = InMemoryCredentialStore::new("s").unwrap();
        let key = key();
        let ctx = AuditContext::new(key.user_id);
        store.store(&key, new_cred("access-1"), &ctx).await.unwrap();

        let refreshed = store.refresh(&key, 1, &StaticRefresher, &ctx).await.unwrap();
        assert_eq!(refreshed.access_token, SecretString::new("refreshed-access"));
        assert_eq!(refreshed.version, 2);
    }

    #[tokio::test]
    async fn refresh_skips_provider_call_if_version_already_moved() {
        let store = InMemoryCredentialStore::new("s").unwrap();
        let key = key();
        let ctx = AuditContext::new(key.user_id);
        store.store(&key, new_cred("access-1"), &ctx).await.unwrap();
        store.refresh(&key, 1, &StaticRefresher, &ctx).await.unwrap();

        // Caller still thinks the version is 1 (stale view); the store
        // must notice version 2 is current and skip calling the provider.
        struct PanicsIfCalled;
        #[async_trait]
        impl TokenRefresher for PanicsIfCalled {
            async fn refresh_token(
                &self,
                _key: &CredentialKey,
                _refresh_token: &SecretString,
            ) -> Result<RefreshedTokens, CredentialError> {
                panic!("should not be called");
            }
        }

        let result = store.refresh(&key, 1, &PanicsIfCalled, &ctx).await.unwrap();
        assert_eq!(result.access_token, SecretString::new("refreshed-access"));
    }

    #[tokio::test]
    async fn failed_refresh_invalidates_credential() {
        struct FailingRefresher;
        #[async_trait]
        impl TokenRefresher for FailingRefresher {
            async fn refresh_token(
                &self,
                _key: &CredentialKey,
                _refresh_token: &SecretString,
            ) -> Result<RefreshedTokens, CredentialError> {
                Err(CredentialError::Provider("token endpoint 400".into()))
            }
        }

        let store = InMemoryCredentialStore::new("s").unwrap();
        let key = key();
        let ctx = AuditContext::new(key.user_id);
        store.store(&key, new_cred("access-1"), &ctx).await.unwrap();

        assert!(store.refresh(&key, 1, &FailingRefresher, &ctx).await.is_err());
        assert!(matches!(
            store.get(&key, &ctx).await,
            Err(CredentialError::Invalid(_))
        ));
    }
}
