#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Engine
//!
//! The workflow execution engine: turns a [`nebula_workflow::WorkflowDefinition`]
//! and a set of trigger inputs into a completed execution by walking the
//! dependency graph level by level, dispatching each live node through
//! [`nebula_runtime::ActionRuntime`], and applying per-node retry and
//! error-policy rules along the way.
//!
//! This crate owns orchestration only. The static workflow shape lives in
//! `nebula-workflow`, execution state machines in `nebula-execution`,
//! action/adapter dispatch in `nebula-action`/`nebula-runtime`, and
//! expression evaluation in `nebula-expression`.

mod config;
mod convert;
mod dispatch;
mod engine;
mod error;
mod flow;
mod result;

pub use config::EngineConfig;
pub use engine::{ExecuteRequest, WorkflowEngine};
pub use error::EngineError;
pub use result::ExecutionResult;
