//! `nebula execution ...` and `nebula run`: execute a workflow, check on
//! it, cancel it, and watch its event stream.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::client::{must_parse_execution_id, must_parse_workflow_id, GatewayClient};
use crate::sse;

#[derive(clap::Subcommand)]
pub enum ExecutionCommand {
    /// Start a new execution of a workflow.
    Run {
        /// Id of the workflow to execute.
        workflow_id: String,
        /// Path to a JSON file of node inputs. Defaults to `{}`.
        #[arg(long)]
        inputs: Option<PathBuf>,
        /// Resume from this node instead of every trigger node.
        #[arg(long)]
        start_from_node: Option<String>,
        /// Stream events until the execution reaches a terminal state.
        #[arg(long)]
        watch: bool,
    },
    /// Fetch an execution's current status.
    Status {
        execution_id: String,
    },
    /// Cancel a running execution.
    Cancel {
        execution_id: String,
    },
    /// Stream an execution's event feed.
    Watch {
        execution_id: String,
    },
    /// List every recorded execution of a workflow.
    History {
        workflow_id: String,
    },
}

pub async fn run(client: &GatewayClient, command: ExecutionCommand) -> Result<()> {
    match command {
        ExecutionCommand::Run { workflow_id, inputs, start_from_node, watch } => {
            let workflow_id = must_parse_workflow_id(&workflow_id)?;
            let inputs = match inputs {
                Some(path) => {
                    let content = std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
                    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))?
                }
                None => Value::Object(Default::default()),
            };
            let mut body = serde_json::json!({ "inputs": inputs });
            if let Some(node_id) = start_from_node {
                body["start_from_node"] = Value::String(node_id);
            }
            let execution_id = client.execute_workflow(workflow_id, &body).await?;
            println!("execution_id: {execution_id}");
            if watch {
                sse::watch_execution(client, execution_id).await?;
            }
        }
        ExecutionCommand::Status { execution_id } => {
            let execution_id = must_parse_execution_id(&execution_id)?;
            print_json(&client.get_execution(execution_id).await?);
        }
        ExecutionCommand::Cancel { execution_id } => {
            let execution_id = must_parse_execution_id(&execution_id)?;
            client.cancel_execution(execution_id).await?;
            println!("canceled {execution_id}");
        }
        ExecutionCommand::Watch { execution_id } => {
            let execution_id = must_parse_execution_id(&execution_id)?;
            sse::watch_execution(client, execution_id).await?;
        }
        ExecutionCommand::History { workflow_id } => {
            let workflow_id = must_parse_workflow_id(&workflow_id)?;
            print_json(&client.workflow_history(workflow_id).await?);
        }
    }
    Ok(())
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("failed to render response as JSON: {err}"),
    }
}
