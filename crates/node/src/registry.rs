//! In-memory node registry.

use std::collections::HashMap;
use std::sync::Arc;

use nebula_core::NodeKey;

use crate::NodeError;
use crate::node_type::NodeType;

/// In-memory registry mapping [`NodeKey`] to [`NodeType`].
///
/// Thread-safety is the caller's responsibility — wrap in `RwLock` if
/// shared across threads.
pub struct NodeRegistry {
    nodes: HashMap<NodeKey, Arc<NodeType>>,
}

impl NodeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: HashMap::new() }
    }

    /// Register a node type. Fails if the key already exists.
    pub fn register(&mut self, node_type: NodeType) -> Result<(), NodeError> {
        let key = node_type.key().clone();
        if self.nodes.contains_key(&key) {
            return Err(NodeError::AlreadyExists(key));
        }
        self.nodes.insert(key, Arc::new(node_type));
        Ok(())
    }

    /// Register or replace a node type under the given key.
    pub fn register_or_replace(&mut self, node_type: NodeType) {
        let key = node_type.key().clone();
        self.nodes.insert(key, Arc::new(node_type));
    }

    /// Look up a node type by key.
    pub fn get(&self, key: &NodeKey) -> Result<Arc<NodeType>, NodeError> {
        self.nodes.get(key).cloned().ok_or_else(|| NodeError::NotFound(key.clone()))
    }

    /// Look up a node type by a `kind.subtype` string.
    pub fn get_by_name(&self, name: &str) -> Result<Arc<NodeType>, NodeError> {
        let key = NodeKey::parse(name)?;
        self.get(&key)
    }

    /// Whether a node with the given key exists.
    #[must_use]
    pub fn contains(&self, key: &NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Remove a node by key.
    pub fn remove(&mut self, key: &NodeKey) -> Result<Arc<NodeType>, NodeError> {
        self.nodes.remove(key).ok_or_else(|| NodeError::NotFound(key.clone()))
    }

    /// Remove all nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// All registered keys.
    #[must_use]
    pub fn keys(&self) -> Vec<NodeKey> {
        self.nodes.keys().cloned().collect()
    }

    /// All registered node types.
    #[must_use]
    pub fn values(&self) -> Vec<Arc<NodeType>> {
        self.nodes.values().cloned().collect()
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry").field("count", &self.nodes.len()).field("keys", &self.keys()).finish()
    }
}
