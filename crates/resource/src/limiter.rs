//! Per-(user, provider) in-flight request cap (spec §5: "the adapter
//! layer enforces per-(user, provider) concurrency caps").

use std::sync::Arc;

use dashmap::DashMap;
use nebula_core::{ProviderId, UserId};
use tokio::sync::Semaphore;

use crate::permit::ResourcePermit;

/// Lazily creates one [`tokio::sync::Semaphore`] per `(user, provider)`
/// pair, each with the same fixed capacity (spec §6's
/// `per_user_adapter_concurrency`, default 10). Semaphores are never
/// removed once created — the number of distinct users and providers a
/// running engine sees is bounded in practice, and tearing one down
/// while a permit is outstanding would be unsound.
pub struct ConcurrencyLimiter {
    capacity: usize,
    semaphores: DashMap<(UserId, ProviderId), Arc<Semaphore>>,
}

impl ConcurrencyLimiter {
    /// Build a limiter capping each `(user, provider)` pair at `capacity`
    /// concurrent in-flight calls.
    pub fn new(capacity: usize) -> Self {
        Self { capacity, semaphores: DashMap::new() }
    }

    /// Acquire a slot for `(user, provider)`, waiting if the pair is
    /// already at capacity. The returned permit releases the slot when
    /// dropped.
    pub async fn acquire(&self, user: UserId, provider: &ProviderId) -> ResourcePermit {
        let semaphore = self.semaphore_for(user, provider);
        let permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
        ResourcePermit::new(permit)
    }

    /// Number of slots currently free for `(user, provider)`, or the
    /// full capacity if no call has been made for that pair yet.
    pub fn available(&self, user: UserId, provider: &ProviderId) -> usize {
        self.semaphores.get(&(user, provider.clone())).map(|s| s.available_permits()).unwrap_or(self.capacity)
    }

    fn semaphore_for(&self, user: UserId, provider: &ProviderId) -> Arc<Semaphore> {
        self.semaphores.entry((user, provider.clone())).or_insert_with(|| Arc::new(Semaphore::new(self.capacity))).clone()
    }
}
