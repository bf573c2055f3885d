//! Registry of tool adapters, looked up by provider at call time.

use std::sync::Arc;

use dashmap::DashMap;
use nebula_action::ToolAdapter;
use nebula_core::ProviderId;

use crate::error::RuntimeError;

/// Thread-safe registry of tool adapters, keyed by the provider they
/// speak to (`"github"`, `"slack"`, `"google_calendar"`, `"http"`).
pub struct ToolAdapterRegistry {
    adapters: DashMap<ProviderId, Arc<dyn ToolAdapter>>,
}

impl ToolAdapterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { adapters: DashMap::new() }
    }

    /// Register an adapter under its own [`ToolAdapter::provider`].
    pub fn register(&self, adapter: Arc<dyn ToolAdapter>) {
        let provider = adapter.provider();
        tracing::info!(%provider, "registered tool adapter");
        self.adapters.insert(provider, adapter);
    }

    /// Look up the adapter for `provider`.
    pub fn get(&self, provider: &ProviderId) -> Result<Arc<dyn ToolAdapter>, RuntimeError> {
        self.adapters.get(provider).map(|entry| entry.value().clone()).ok_or_else(|| RuntimeError::AdapterNotFound { provider: provider.to_string() })
    }

    /// Number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for ToolAdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
