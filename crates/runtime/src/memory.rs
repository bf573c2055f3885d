//! In-process key-value memory store backing `memory` nodes attached to
//! an `ai_agent`.
//!
//! Scoped per `(execution_id, node_id)` so two executions, or two
//! distinct memory nodes within the same execution, never see each
//! other's entries. Entries do not outlive the process; there is no
//! persistence layer behind this store.

use dashmap::DashMap;
use nebula_core::{ExecutionId, NodeId};
use serde_json::Value;

/// A single memory node's address within the store.
type MemoryScope = (ExecutionId, NodeId);

/// Key-value memory for `memory` nodes of subtype `key_value`.
///
/// Other documented memory subtypes (`buffer`, `vector`, `document`,
/// `embedding`) are not implemented; callers should reject those before
/// reaching this store.
pub struct KeyValueMemoryStore {
    entries: DashMap<MemoryScope, DashMap<String, Value>>,
}

impl KeyValueMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Fetch a value, or `Value::Null` if the key is unset.
    #[must_use]
    pub fn get(&self, execution_id: ExecutionId, node_id: NodeId, key: &str) -> Value {
        self.entries.get(&(execution_id, node_id)).and_then(|scope| scope.get(key).map(|v| v.clone())).unwrap_or(Value::Null)
    }

    /// Set a value, returning the previous one if any.
    pub fn set(&self, execution_id: ExecutionId, node_id: NodeId, key: String, value: Value) -> Option<Value> {
        self.entries.entry((execution_id, node_id)).or_insert_with(DashMap::new).insert(key, value)
    }

    /// Drop every entry scoped to one memory node, once its execution
    /// completes.
    pub fn clear_scope(&self, execution_id: ExecutionId, node_id: NodeId) {
        self.entries.remove(&(execution_id, node_id));
    }
}

impl Default for KeyValueMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
