#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Runtime
//!
//! Action execution orchestration for the Nebula workflow engine.
//!
//! This crate provides:
//! - [`ActionRuntime`] -- dispatches actions and tool adapter calls,
//!   enforcing the data passing policy and emitting telemetry
//! - [`ToolAdapterRegistry`] -- looks up tool adapters by provider
//! - [`StoreCredentialProvider`] -- the tool adapter layer's
//!   `CredentialProvider` port, implemented over `nebula-credential`
//! - [`KeyValueMemoryStore`] -- in-process key-value memory for `memory`
//!   nodes attached to an `ai_agent`
//!
//! The runtime sits between the engine (which schedules work) and the
//! action/adapter layer (which performs it). It resolves actions and
//! adapters from their registries, enforces data passing policies, and
//! emits telemetry events.

pub mod adapter_registry;
pub mod credential_provider;
pub mod error;
pub mod memory;
pub mod runtime;

pub use adapter_registry::ToolAdapterRegistry;
pub use credential_provider::StoreCredentialProvider;
pub use error::RuntimeError;
pub use memory::KeyValueMemoryStore;
pub use runtime::ActionRuntime;
