//! Execution planning — builds a parallel execution schedule from a workflow.

use chrono::{DateTime, Utc};
use nebula_action::ExecutionBudget;
use nebula_core::{ExecutionId, NodeId, WorkflowId};
use nebula_workflow::{DependencyGraph, WorkflowDefinition};
use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;

/// A pre-computed execution plan derived from a workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Execution this plan belongs to.
    pub execution_id: ExecutionId,
    /// Workflow this plan was derived from.
    pub workflow_id: WorkflowId,
    /// Parallel execution groups (each group can run concurrently).
    pub parallel_groups: Vec<Vec<NodeId>>,
    /// Nodes with no predecessors (start points).
    pub entry_nodes: Vec<NodeId>,
    /// Nodes with no successors (end points).
    pub exit_nodes: Vec<NodeId>,
    /// Total number of nodes in the plan.
    pub total_nodes: usize,
    /// Resource budget for this execution.
    #[serde(skip, default)]
    pub budget: ExecutionBudget,
    /// When this plan was created.
    pub created_at: DateTime<Utc>,
}

impl ExecutionPlan {
    /// Build an execution plan from a workflow definition.
    pub fn from_workflow(
        execution_id: ExecutionId,
        workflow: &WorkflowDefinition,
        budget: ExecutionBudget,
    ) -> Result<Self, ExecutionError> {
        if workflow.nodes.is_empty() {
            return Err(ExecutionError::PlanValidation(
                "workflow has no nodes".into(),
            ));
        }

        let graph = DependencyGraph::from_definition(workflow).map_err(|e| {
            ExecutionError::PlanValidation(format!("graph construction failed: {e}"))
        })?;

        let parallel_groups = graph.compute_levels().map_err(|e| {
            ExecutionError::PlanValidation(format!("level computation failed: {e}"))
        })?;

        let entry_nodes = graph.entry_nodes();
        let exit_nodes = graph.exit_nodes();
        let total_nodes = graph.node_count();

        Ok(Self {
            execution_id,
            workflow_id: workflow.id,
            parallel_groups,
            entry_nodes,
            exit_nodes,
            total_nodes,
            budget,
            created_at: Utc::now(),
        })
    }
}
