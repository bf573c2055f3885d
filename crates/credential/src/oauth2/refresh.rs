//! In-process single-flight coordination for token refresh.
//!
//! [`crate::store::CredentialStore::refresh`]'s row lock already
//! guarantees correctness if N callers in the same process race into it:
//! only the first does a provider round trip, the rest see the bumped
//! version and return the fresh value. `RefreshCoordinator` sits in front
//! of that and avoids the wasted row-lock acquisitions entirely — all N
//! callers for the same `(user, provider)` converge on one in-flight
//! future and share its result.

use std::sync::Arc;

use dashmap::DashMap;
use nebula_core::CredentialKey;
use tokio::sync::{oneshot, Mutex as AsyncMutex, Semaphore};

use crate::error::CredentialError;
use crate::store::OAuth2Credential;

type SharedResult = Result<OAuth2Credential, CredentialError>;

struct InFlight {
    /// Exactly one permit; whoever acquires it becomes the leader that
    /// performs the refresh.
    semaphore: Arc<Semaphore>,
    /// Callers that arrived while a leader was already refreshing; the
    /// leader sends its result to every waiter on this list before
    /// releasing the semaphore.
    waiters: AsyncMutex<Vec<oneshot::Sender<SharedResult>>>,
}

/// Deduplicates concurrent refresh calls for the same `(user, provider,
/// integration)`: "at most one provider token-endpoint call is issued;
/// all callers observe the same resulting credential."
#[derive(Default)]
pub struct RefreshCoordinator {
    in_flight: DashMap<CredentialKey, Arc<InFlight>>,
}

impl RefreshCoordinator {
    /// Build an empty coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `do_refresh` for `key`, collapsing concurrent callers into a
    /// single execution.
    ///
    /// The first caller to arrive for `key` runs `do_refresh` and becomes
    /// the leader; every other caller that arrives before the leader
    /// finishes registers a [`oneshot`] receiver and is woken with the
    /// leader's result instead of running `do_refresh` itself.
    pub async fn refresh_or_join<F, Fut>(
        &self,
        key: &CredentialKey,
        do_refresh: F,
    ) -> SharedResult
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = SharedResult>,
    {
        let state = self
            .in_flight
            .entry(key.clone())
            .or_insert_with(|| {
                Arc::new(InFlight {
                    semaphore: Arc::new(Semaphore::new(1)),
                    waiters: AsyncMutex::new(Vec::new()),
                })
            })
            .clone();

        match state.semaphore.clone().try_acquire_owned() {
            Ok(permit) => {
                let result = do_refresh().await;
                // Hold the waiters lock across the drain *and* the permit
                // release: a follower that fails `try_acquire` always
                // blocks on this same lock before it can queue itself, so
                // it either joins the drain or arrives after the entry is
                // reusable for a fresh, later refresh — never stranded.
                let mut waiters = state.waiters.lock().await;
                for tx in waiters.drain(..) {
                    let _ = tx.send(result.clone());
                }
                drop(permit);
                drop(waiters);
                result
            }
            Err(_) => {
                let (tx, rx) = oneshot::channel();
                state.waiters.lock().await.push(tx);
                rx.await.unwrap_or(Err(CredentialError::RefreshCanceled))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_schema::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn key() -> CredentialKey {
        CredentialKey::new(nebula_core::UserId::v4(), "slack", "default")
    }

    fn stub_credential() -> OAuth2Credential {
        OAuth2Credential {
            key: key(),
            access_token: SecretString::new("refreshed"),
            refresh_token: None,
            token_type: "Bearer".into(),
            expires_at: None,
            scopes: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
            last_used_at: None,
            version: 2,
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let coordinator = Arc::new(RefreshCoordinator::new());
        let key = key();
        let call_count = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let coordinator = coordinator.clone();
            let key = key.clone();
            let call_count = call_count.clone();
            handles.push(tokio::spawn(async move {
                coordinator
                    .refresh_or_join(&key, || async {
                        call_count.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(stub_credential())
                    })
                    .await
            }));
        }

        let mut results = Vec::new();
        for h in handles {
            results.push(h.await.unwrap());
        }

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        for r in results {
            assert_eq!(r.unwrap().access_token, SecretString::new("refreshed"));
        }
    }

    #[tokio::test]
    async fn sequential_calls_each_run_independently() {
        let coordinator = RefreshCoordinator::new();
        let key = key();
        let call_count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let call_count = call_count.clone();
            coordinator
                .refresh_or_join(&key, || async move {
                    call_count.fetch_add(1, Ordering::SeqCst);
                    Ok(stub_credential())
                })
                .await
                .unwrap();
        }

        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }
}
