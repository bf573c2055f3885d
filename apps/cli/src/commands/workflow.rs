//! `nebula workflow ...`: submit, inspect, and validate workflow
//! definitions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use nebula_core::{UserId, WorkflowId};
use nebula_workflow::{Connection, NodeDefinition, WorkflowConfig, WorkflowDefinition};
use serde::Deserialize;
use serde_json::Value;

use crate::client::{must_parse_workflow_id, GatewayClient};

#[derive(clap::Subcommand)]
pub enum WorkflowCommand {
    /// Create a workflow from a JSON or YAML file.
    Submit {
        /// Path to the workflow definition file.
        file: PathBuf,
    },
    /// Replace an existing workflow's definition.
    Update {
        /// Id of the workflow to replace.
        id: String,
        /// Path to the replacement definition file.
        file: PathBuf,
    },
    /// Fetch a single workflow by id.
    Show {
        id: String,
    },
    /// List every workflow owned by the calling user.
    List,
    /// Delete a workflow.
    Delete {
        id: String,
    },
    /// Check a definition file's structure locally, without contacting
    /// the gateway.
    Validate {
        file: PathBuf,
    },
}

pub async fn run(client: &GatewayClient, command: WorkflowCommand) -> Result<()> {
    match command {
        WorkflowCommand::Submit { file } => {
            let body = read_definition_file(&file)?;
            let response = client.create_workflow(&body).await?;
            print_json(&response);
        }
        WorkflowCommand::Update { id, file } => {
            let id = must_parse_workflow_id(&id)?;
            let body = read_definition_file(&file)?;
            let response = client.update_workflow(id, &body).await?;
            print_json(&response);
        }
        WorkflowCommand::Show { id } => {
            let id = must_parse_workflow_id(&id)?;
            let response = client.get_workflow(id).await?;
            print_json(&response);
        }
        WorkflowCommand::List => {
            let response = client.list_workflows().await?;
            print_json(&response);
        }
        WorkflowCommand::Delete { id } => {
            let id = must_parse_workflow_id(&id)?;
            client.delete_workflow(id).await?;
            println!("deleted {id}");
        }
        WorkflowCommand::Validate { file } => validate_file(&file)?,
    }
    Ok(())
}

/// Reads a workflow file as JSON or YAML, picked by extension (`.yaml`/
/// `.yml` vs anything else), and returns it as a generic JSON value
/// suitable for `POST`/`PUT /v1/workflows/...` — the gateway does the
/// real structural validation.
fn read_definition_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if matches!(path.extension().and_then(|ext| ext.to_str()), Some("yaml") | Some("yml")) {
        serde_yaml::from_str(&content).with_context(|| format!("{} is not valid YAML", path.display()))
    } else {
        serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
    }
}

#[derive(Debug, Deserialize)]
struct LocalWorkflowFile {
    #[serde(default)]
    name: String,
    nodes: Vec<NodeDefinition>,
    #[serde(default)]
    connections: Vec<Connection>,
    #[serde(default)]
    config: WorkflowConfig,
}

/// Runs the same structural checks the gateway applies on create/update
/// (unique/referenced node ids, acyclic graph, well-formed
/// `attached_nodes`) against a placeholder workflow, so an author can
/// catch a malformed file before it ever reaches the network.
fn validate_file(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: LocalWorkflowFile = if matches!(path.extension().and_then(|ext| ext.to_str()), Some("yaml") | Some("yml")) {
        serde_yaml::from_str(&content).with_context(|| format!("{} is not valid YAML", path.display()))?
    } else {
        serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))?
    };

    let now = Utc::now();
    let workflow = WorkflowDefinition {
        id: WorkflowId::nil(),
        owner_id: UserId::nil(),
        team_id: None,
        name: parsed.name,
        description: None,
        version: nebula_core::Version::new(0, 0, 0),
        nodes: parsed.nodes,
        connections: parsed.connections,
        variables: Default::default(),
        config: parsed.config,
        tags: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    match nebula_workflow::validate_structure(&workflow) {
        Ok(graph) => {
            let levels = graph.compute_levels().context("graph passed structural checks but has no valid level order")?;
            println!("valid: {} nodes, {} levels", workflow.nodes.len(), levels.len());
            Ok(())
        }
        Err(err) => anyhow::bail!("invalid workflow: {err}"),
    }
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("failed to render response as JSON: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn validate_accepts_an_acyclic_workflow() {
        let file = write_fixture(
            r#"{
                "name": "demo",
                "nodes": [
                    {"id": "00000000-0000-0000-0000-000000000001", "name": "t", "key": "trigger.manual", "timeout_secs": null},
                    {"id": "00000000-0000-0000-0000-000000000002", "name": "a", "key": "action.http", "timeout_secs": null}
                ],
                "connections": [
                    {"from_node": "00000000-0000-0000-0000-000000000001", "to_node": "00000000-0000-0000-0000-000000000002", "output_key": "main", "conversion_function": "$input"}
                ]
            }"#,
            ".json",
        );
        validate_file(file.path()).unwrap();
    }

    #[test]
    fn validate_rejects_a_dangling_connection() {
        let file = write_fixture(
            r#"{
                "name": "demo",
                "nodes": [
                    {"id": "00000000-0000-0000-0000-000000000001", "name": "t", "key": "trigger.manual", "timeout_secs": null}
                ],
                "connections": [
                    {"from_node": "00000000-0000-0000-0000-000000000001", "to_node": "00000000-0000-0000-0000-000000000099", "output_key": "main", "conversion_function": "$input"}
                ]
            }"#,
            ".json",
        );
        assert!(validate_file(file.path()).is_err());
    }

    #[test]
    fn read_definition_file_accepts_yaml() {
        let file = write_fixture("name: demo\nnodes: []\nconnections: []\n", ".yaml");
        let value = read_definition_file(file.path()).unwrap();
        assert_eq!(value["name"], "demo");
    }
}
