//! Audit trail for credential operations (spec: `store`, `refresh`,
//! `use`, `revoke`; tokens never included, only reference ids).

use chrono::{DateTime, Utc};
use nebula_core::{CorrelationId, ProviderId, UserId};

/// The operation an [`AuditRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// A credential was stored (initial authorization or manual update).
    Store,
    /// A token refresh was attempted.
    Refresh,
    /// A credential was read for use by a tool adapter.
    Use,
    /// A credential was explicitly revoked.
    Revoke,
}

impl AuditAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Refresh => "refresh",
            Self::Use => "use",
            Self::Revoke => "revoke",
        }
    }
}

/// The result of the audited operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The operation succeeded.
    Success,
    /// The operation failed, with a short, secret-free reason.
    Failure(String),
}

/// One audit trail entry. Never carries token material, only the
/// `(user, provider)` reference and a correlation id for tracing.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    /// The user the credential belongs to.
    pub actor_user: UserId,
    /// The operation performed.
    pub action: AuditAction,
    /// The provider the credential is for.
    pub provider: ProviderId,
    /// Success or a sanitized failure reason.
    pub outcome: AuditOutcome,
    /// When the operation completed.
    pub timestamp: DateTime<Utc>,
    /// Correlates this record with the request/execution that triggered it.
    pub correlation_id: CorrelationId,
}

/// Request context threaded through credential operations purely for
/// audit/tracing attribution; carries no secret material.
#[derive(Debug, Clone)]
pub struct AuditContext {
    /// The user performing the operation.
    pub actor_user: UserId,
    /// Correlates this operation with the surrounding workflow execution.
    pub correlation_id: CorrelationId,
}

impl AuditContext {
    /// Build a context for `actor_user`, generating a fresh correlation id.
    #[must_use]
    pub fn new(actor_user: UserId) -> Self {
        Self {
            actor_user,
            correlation_id: CorrelationId::v4(),
        }
    }

    /// Build a context that carries an existing correlation id (e.g. the
    /// one for the workflow execution this operation happens inside of).
    #[must_use]
    pub fn with_correlation_id(actor_user: UserId, correlation_id: CorrelationId) -> Self {
        Self {
            actor_user,
            correlation_id,
        }
    }
}

/// Where audit records go. Implementations must never be given access to
/// plaintext secrets — [`AuditRecord`] structurally cannot carry any.
pub trait AuditSink: Send + Sync {
    /// Record one audit entry.
    fn record(&self, record: AuditRecord);
}

/// Emits every audit record as a structured `tracing` event at `info`
/// level (or `warn` for failures). The default sink for deployments that
/// forward `tracing` output to their log pipeline rather than a separate
/// audit store.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: AuditRecord) {
        match &record.outcome {
            AuditOutcome::Success => tracing::info!(
                actor_user = %record.actor_user,
                action = record.action.as_str(),
                provider = %record.provider,
                correlation_id = %record.correlation_id,
                "credential audit"
            ),
            AuditOutcome::Failure(reason) => tracing::warn!(
                actor_user = %record.actor_user,
                action = record.action.as_str(),
                provider = %record.provider,
                correlation_id = %record.correlation_id,
                reason = %reason,
                "credential audit"
            ),
        }
    }
}
