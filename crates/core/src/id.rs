//! Unique identifiers for Nebula entities.
//!
//! Each identifier is a strongly typed UUID wrapper built with
//! [`domain_key::define_uuid`]. The domain marker types prevent mixing,
//! e.g. passing a `NodeId` where a `WorkflowId` is expected is a compile
//! error. All ID types are `Copy` (16 bytes), support `v4()`/`nil()`/
//! `parse(&str)`, and serialize as plain UUID strings.

use domain_key::define_uuid;

pub use domain_key::UuidParseError;

define_uuid!(UserIdDomain => UserId);
define_uuid!(TenantIdDomain => TenantId);
define_uuid!(WorkflowIdDomain => WorkflowId);
define_uuid!(NodeIdDomain => NodeId);
define_uuid!(ActionIdDomain => ActionId);
define_uuid!(ExecutionIdDomain => ExecutionId);
define_uuid!(NodeExecutionIdDomain => NodeExecutionId);
define_uuid!(CredentialIdDomain => CredentialId);
define_uuid!(IntegrationIdDomain => IntegrationId);
define_uuid!(ResourceIdDomain => ResourceId);
define_uuid!(CorrelationIdDomain => CorrelationId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v4_is_not_nil() {
        assert!(!WorkflowId::v4().is_nil());
    }

    #[test]
    fn nil_roundtrips() {
        let id = NodeId::nil();
        assert_eq!(id.to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn distinct_domains_are_distinct_types() {
        fn accepts_node(_id: NodeId) {}
        fn accepts_workflow(_id: WorkflowId) {}
        accepts_node(NodeId::v4());
        accepts_workflow(WorkflowId::v4());
    }

    #[test]
    fn parse_roundtrips_through_display() {
        let raw = "550e8400-e29b-41d4-a716-446655440000";
        let id = ExecutionId::parse(raw).unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn serde_roundtrip() {
        let id = CredentialId::v4();
        let json = serde_json::to_string(&id).unwrap();
        let back: CredentialId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
