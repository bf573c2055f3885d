//! The top-level [`WorkflowDefinition`].

use chrono::{DateTime, Utc};
use nebula_core::{UserId, Version, WorkflowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::config::WorkflowConfig;
use crate::connection::Connection;
use crate::node::NodeDefinition;

/// A complete workflow: its nodes, the connections between them, and
/// workflow-level configuration.
///
/// Reserves but does not interpret a `team_id` field (spec §1 non-goal:
/// team-level credential sharing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Stable identity.
    pub id: WorkflowId,
    /// The user that owns this workflow.
    pub owner_id: UserId,
    /// Reserved for future team-level sharing; unused.
    #[serde(default)]
    pub team_id: Option<String>,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Semantic version of this definition.
    pub version: Version,
    /// The node set. Ids must be unique within the workflow.
    pub nodes: Vec<NodeDefinition>,
    /// The edge set.
    pub connections: Vec<Connection>,
    /// Workflow-scoped variables available to every node's parameter
    /// templates.
    #[serde(default)]
    pub variables: HashMap<String, Value>,
    /// Workflow-level settings (timeout, default retry policy, timezone).
    #[serde(default)]
    pub config: WorkflowConfig,
    /// Free-form labels for search/organization.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl WorkflowDefinition {
    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: nebula_core::NodeId) -> Option<&NodeDefinition> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All trigger-kind nodes.
    pub fn trigger_nodes(&self) -> impl Iterator<Item = &NodeDefinition> {
        self.nodes.iter().filter(|n| n.is_trigger())
    }

    /// All outgoing connections from a node.
    pub fn outgoing(&self, id: nebula_core::NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.from_node == id)
    }

    /// All incoming connections to a node.
    pub fn incoming(&self, id: nebula_core::NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.to_node == id)
    }
}
