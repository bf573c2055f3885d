//! Scope system — resource lifecycle / isolation boundary.
//!
//! A [`ScopeLevel`] pins an entity to the level of the system at which it
//! is valid: credentials, caches, and resource pools all key off a scope
//! to enforce per-user / per-workflow isolation (spec §3: "refuse to
//! cross user boundary").

use serde::{Deserialize, Serialize};

use crate::id::{ExecutionId, TenantId, UserId, WorkflowId};

/// The level at which a scoped resource is valid.
///
/// Ordered from broadest to narrowest. A credential or cache entry scoped
/// to `Execution` is invisible to a request scoped to `Workflow` even for
/// the same user, and vice versa — scopes do not implicitly nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum ScopeLevel {
    /// Global, process-wide resource (e.g. a provider registry).
    Global,
    /// Scoped to a tenant (team/organization) — reserved, unused at this
    /// scope (spec §1 non-goals: team-level credential sharing).
    Tenant(TenantId),
    /// Scoped to a single user — the default for credentials.
    User(UserId),
    /// Scoped to a workflow definition.
    Workflow(WorkflowId),
    /// Scoped to a single execution (run).
    Execution(ExecutionId),
}

impl ScopeLevel {
    /// Returns `true` if `self` and `other` refer to the same scope.
    #[must_use]
    pub fn matches(&self, other: &ScopeLevel) -> bool {
        self == other
    }

    /// The user this scope is attributable to, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            _ => None,
        }
    }
}

/// Implemented by types that are pinned to a [`ScopeLevel`].
pub trait Scoped {
    /// The scope this value belongs to.
    fn scope(&self) -> ScopeLevel;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_user_scope_matches() {
        let u = UserId::v4();
        assert!(ScopeLevel::User(u).matches(&ScopeLevel::User(u)));
    }

    #[test]
    fn different_users_do_not_match() {
        let a = ScopeLevel::User(UserId::v4());
        let b = ScopeLevel::User(UserId::v4());
        assert!(!a.matches(&b));
    }

    #[test]
    fn workflow_scope_does_not_match_execution_scope() {
        let w = WorkflowId::v4();
        let e = ExecutionId::v4();
        // Same underlying bit pattern would still not be `==` since the
        // variants differ — scopes are nominal, not structural.
        let a = ScopeLevel::Workflow(w);
        let b = ScopeLevel::Execution(e);
        assert!(!a.matches(&b));
    }

    #[test]
    fn user_id_extraction() {
        let u = UserId::v4();
        assert_eq!(ScopeLevel::User(u).user_id(), Some(u));
        assert_eq!(ScopeLevel::Global.user_id(), None);
    }
}
