//! `nebula`: a thin command-line client for the `nebula-api` gateway.
//!
//! Every subcommand maps to one gateway endpoint; the binary carries no
//! engine, credential store, or workflow state of its own — it's a
//! `reqwest` client plus `clap` parsing, same shape as the gateway it
//! talks to but over HTTP instead of in-process.

mod client;
mod commands;
mod sse;

use anyhow::{Context, Result};
use clap::Parser;
use nebula_log::Config as LogConfig;

use client::{must_parse_user_id, GatewayClient};
use commands::{credential::CredentialCommand, execution::ExecutionCommand, workflow::WorkflowCommand};

#[derive(Parser)]
#[command(name = "nebula", version, about = "Command-line client for the Nebula workflow gateway")]
struct Cli {
    /// Gateway base URL.
    #[arg(long, env = "NEBULA_API_URL", default_value = "http://127.0.0.1:8080")]
    api_url: String,

    /// Acting user id. The gateway has no login of its own — whichever
    /// id is passed here is trusted as-is, same as a fronting proxy
    /// would be trusted in production.
    #[arg(long, env = "NEBULA_USER_ID")]
    user_id: String,

    #[arg(long, env = "NEBULA_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Workflow definitions: submit, inspect, validate.
    #[command(subcommand)]
    Workflow(WorkflowCommand),
    /// Executions: run, status, cancel, watch, history.
    #[command(subcommand)]
    Execution(ExecutionCommand),
    /// Credentials and OAuth2 authorization.
    #[command(subcommand)]
    Credential(CredentialCommand),
    /// Print shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = nebula_log::init(LogConfig { level: cli.log_level.clone(), ..LogConfig::default() })
        .context("failed to install logger")?;

    if let Command::Completions { shell } = cli.command {
        let mut app = <Cli as clap::CommandFactory>::command();
        let name = app.get_name().to_string();
        clap_complete::generate(shell, &mut app, name, &mut std::io::stdout());
        return Ok(());
    }

    let user_id = must_parse_user_id(&cli.user_id)?;
    let client = GatewayClient::new(cli.api_url, user_id)?;

    match cli.command {
        Command::Workflow(command) => commands::workflow::run(&client, command).await,
        Command::Execution(command) => commands::execution::run(&client, command).await,
        Command::Credential(command) => commands::credential::run(&client, command).await,
        Command::Completions { .. } => unreachable!("handled above"),
    }
}
