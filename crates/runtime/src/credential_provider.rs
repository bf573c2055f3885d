//! Implements the tool adapter layer's [`CredentialProvider`] port over
//! `nebula-credential`'s encrypted store and single-flight refresh
//! coordinator.

use std::sync::Arc;

use async_trait::async_trait;
use nebula_action::{AccessToken, CredentialProvider};
use nebula_core::CredentialKey;
use nebula_credential::oauth2::RefreshCoordinator;
use nebula_credential::{AuditContext, CredentialStore, TokenRefresher};
use nebula_error::NebulaError;

/// Resolves and refreshes access tokens by delegating to a
/// [`CredentialStore`], collapsing concurrent refreshes for the same
/// `(user, provider, integration)` through a [`RefreshCoordinator`]
/// (spec: "at most one network call per refresh storm").
pub struct StoreCredentialProvider {
    store: Arc<dyn CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    coordinator: Arc<RefreshCoordinator>,
}

impl StoreCredentialProvider {
    /// Build a provider over `store`, refreshing through `refresher`.
    pub fn new(store: Arc<dyn CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self { store, refresher, coordinator: Arc::new(RefreshCoordinator::new()) }
    }
}

#[async_trait]
impl CredentialProvider for StoreCredentialProvider {
    async fn access_token(&self, key: &CredentialKey) -> Result<AccessToken, NebulaError> {
        let ctx = AuditContext::new(key.user_id);
        let cred = self.store.get(key, &ctx).await?;
        Ok(AccessToken { token: cred.access_token.expose().to_owned() })
    }

    async fn refresh(&self, key: &CredentialKey) -> Result<AccessToken, NebulaError> {
        let ctx = AuditContext::new(key.user_id);
        // The version the store currently holds is what a racing refresh
        // call would also observe; reading it fresh here (rather than
        // threading the caller's stale version through) keeps this port
        // method's signature free of store internals.
        let known_version = self.store.get(key, &ctx).await?.version;

        let store = self.store.clone();
        let refresher = self.refresher.clone();
        let key_owned = key.clone();
        let ctx_owned = ctx.clone();
        let cred = self
            .coordinator
            .refresh_or_join(key, move || {
                let store = store.clone();
                let refresher = refresher.clone();
                let key = key_owned.clone();
                let ctx = ctx_owned.clone();
                async move { store.refresh(&key, known_version, refresher.as_ref(), &ctx).await }
            })
            .await?;

        Ok(AccessToken { token: cred.access_token.expose().to_owned() })
    }
}
