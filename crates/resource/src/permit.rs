//! RAII permit releasing its concurrency slot on drop.

use tokio::sync::OwnedSemaphorePermit;

/// Holds one adapter's slot in a [`crate::ConcurrencyLimiter`]. Releases
/// the slot automatically when dropped; there is no explicit `release`
/// method, mirroring the rest of this workspace's RAII guard
/// conventions rather than requiring callers to remember to give a slot
/// back.
pub struct ResourcePermit {
    _permit: OwnedSemaphorePermit,
}

impl ResourcePermit {
    pub(crate) fn new(permit: OwnedSemaphorePermit) -> Self {
        Self { _permit: permit }
    }
}

impl std::fmt::Debug for ResourcePermit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourcePermit").finish_non_exhaustive()
    }
}
