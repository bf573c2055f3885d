//! Common cross-cutting traits implemented by Nebula entities.

use crate::scope::ScopeLevel;

/// A type with a stable identity, distinct from its content.
pub trait Identifiable {
    /// The identifier type (typically one of the `nebula-core` typed UUIDs).
    type Id: Copy + Eq + std::hash::Hash;

    /// This value's identity.
    fn id(&self) -> Self::Id;
}

/// A type that carries an execution-time context (scope, correlation).
///
/// Node executors and tool adapters implement this so the engine can
/// thread cancellation and observability context through without every
/// layer re-deriving it.
pub trait HasContext {
    /// The scope this operation runs under.
    fn scope(&self) -> ScopeLevel;

    /// A correlation id used to tie together logs, events, and audit
    /// records for a single logical operation.
    fn correlation_id(&self) -> uuid::Uuid;
}
