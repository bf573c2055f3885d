//! Looks up an [`Action`] by its [`NodeKey`] at dispatch time.

use std::collections::HashMap;
use std::sync::Arc;

use nebula_core::NodeKey;

use crate::action::Action;

/// Error returned when a node key has no registered action.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("no action registered for node key `{0}`")]
pub struct ActionNotFound(pub String);

/// Maps a workflow's `kind.subtype` node keys to their executable
/// actions. Built once at startup and shared read-only across
/// concurrent executions.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<NodeKey, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under its own metadata's node key.
    pub fn register(&mut self, action: Arc<dyn Action>) {
        let key = action.metadata().key.clone();
        self.actions.insert(key, action);
    }

    /// Look up an action by node key.
    pub fn get(&self, key: &NodeKey) -> Result<&Arc<dyn Action>, ActionNotFound> {
        self.actions.get(key).ok_or_else(|| ActionNotFound(key.to_string()))
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// `true` if no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::action::{ActionContext, ActionMetadata, ActionResult};

    struct Noop(ActionMetadata);

    #[async_trait]
    impl Action for Noop {
        fn metadata(&self) -> &ActionMetadata {
            &self.0
        }

        async fn execute(&self, _ctx: &ActionContext) -> ActionResult {
            ActionResult::success(serde_json::json!({}), 0)
        }
    }

    #[test]
    fn lookup_missing_key_is_an_error() {
        let registry = ActionRegistry::new();
        let err = registry.get(&NodeKey::new("action", "http_request")).unwrap_err();
        assert_eq!(err.0, "action.http_request");
    }

    #[test]
    fn register_then_look_up() {
        let mut registry = ActionRegistry::new();
        let key = NodeKey::new("action", "http_request");
        registry.register(Arc::new(Noop(ActionMetadata::new(key.clone(), "HTTP Request", "desc"))));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&key).is_ok());
    }
}
