//! Whole-workflow validation beyond pure graph structure.

use std::collections::HashSet;

use nebula_core::NodeId;

use crate::error::WorkflowError;
use crate::graph::DependencyGraph;
use crate::node::NodeKind;
use crate::workflow::WorkflowDefinition;

/// Validate a workflow's structure: unique/referenced node ids, acyclic
/// graph (except loop nodes), and well-formed `attached_nodes`.
///
/// Trigger-node presence is intentionally **not** checked here — whether
/// it's required depends on the execution's `skip_trigger_validation`
/// flag (spec §4.1), so callers check [`has_trigger`] themselves when
/// that flag is false.
pub fn validate_structure(workflow: &WorkflowDefinition) -> Result<DependencyGraph, WorkflowError> {
    let graph = DependencyGraph::from_definition(workflow)?;

    let schedulable: HashSet<NodeId> = workflow
        .nodes
        .iter()
        .filter(|n| kind_of(n.kind_str()).is_some_and(NodeKind::is_schedulable))
        .map(|n| n.id)
        .collect();

    for node in &workflow.nodes {
        if node.attached_nodes.is_empty() {
            continue;
        }
        for attached_id in &node.attached_nodes {
            let Some(attached) = workflow.node(*attached_id) else {
                return Err(WorkflowError::InvalidAttachment {
                    parent: node.id,
                    attached: *attached_id,
                });
            };
            let is_attachable = matches!(kind_of(attached.kind_str()), Some(NodeKind::Tool | NodeKind::Memory));
            if !is_attachable {
                return Err(WorkflowError::InvalidAttachment {
                    parent: node.id,
                    attached: *attached_id,
                });
            }
        }
    }
    let _ = schedulable;
    Ok(graph)
}

/// Whether the workflow has at least one trigger node.
#[must_use]
pub fn has_trigger(workflow: &WorkflowDefinition) -> bool {
    workflow.trigger_nodes().next().is_some()
}

fn kind_of(raw: &str) -> Option<NodeKind> {
    match raw {
        "trigger" => Some(NodeKind::Trigger),
        "ai_agent" => Some(NodeKind::AiAgent),
        "external_action" => Some(NodeKind::ExternalAction),
        "action" => Some(NodeKind::Action),
        "flow" => Some(NodeKind::Flow),
        "human" => Some(NodeKind::Human),
        "tool" => Some(NodeKind::Tool),
        "memory" => Some(NodeKind::Memory),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkflowConfig;
    use crate::connection::Connection;
    use crate::node::NodeDefinition;
    use chrono::Utc;
    use nebula_core::{NodeKey, UserId, Version, WorkflowId};
    use std::collections::HashMap;

    fn wf(nodes: Vec<NodeDefinition>, connections: Vec<Connection>) -> WorkflowDefinition {
        let now = Utc::now();
        WorkflowDefinition {
            id: WorkflowId::v4(),
            owner_id: UserId::v4(),
            team_id: None,
            name: "test".into(),
            description: None,
            version: Version::new(0, 1, 0),
            nodes,
            connections,
            variables: HashMap::new(),
            config: WorkflowConfig::default(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn trigger_detection() {
        let trigger = NodeDefinition::new(NodeId::v4(), "t", NodeKey::new("trigger", "manual"));
        let workflow = wf(vec![trigger], vec![]);
        assert!(has_trigger(&workflow));

        let action = NodeDefinition::new(NodeId::v4(), "a", NodeKey::new("action", "http"));
        let workflow = wf(vec![action], vec![]);
        assert!(!has_trigger(&workflow));
    }

    #[test]
    fn attached_tool_is_valid() {
        let mut agent = NodeDefinition::new(NodeId::v4(), "agent", NodeKey::new("ai_agent", "chat"));
        let tool = NodeDefinition::new(NodeId::v4(), "tool", NodeKey::new("tool", "calendar"));
        agent.attached_nodes.push(tool.id);
        let workflow = wf(vec![agent, tool], vec![]);
        assert!(validate_structure(&workflow).is_ok());
    }

    #[test]
    fn attaching_a_schedulable_node_is_rejected() {
        let mut agent = NodeDefinition::new(NodeId::v4(), "agent", NodeKey::new("ai_agent", "chat"));
        let action = NodeDefinition::new(NodeId::v4(), "a", NodeKey::new("action", "http"));
        agent.attached_nodes.push(action.id);
        let workflow = wf(vec![agent, action], vec![]);
        assert!(matches!(
            validate_structure(&workflow),
            Err(WorkflowError::InvalidAttachment { .. })
        ));
    }
}
