//! Canonical metric names shared by the engine, runtime, and gateway.
//!
//! Call sites previously reached for ad hoc string literals
//! (`"executions_started_total"`, `"nodes_failed_total"`, ...); a single
//! source of truth keeps those from drifting apart as instrumentation
//! grows, and lets an exporter enumerate every known metric without the
//! registry itself tracking names.

/// The shape of value a named metric holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
}

/// A metric's name, kind, and one-line description.
#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub kind: MetricKind,
    pub help: &'static str,
}

pub const EXECUTIONS_STARTED_TOTAL: &str = "executions_started_total";
pub const EXECUTIONS_SUCCEEDED_TOTAL: &str = "executions_succeeded_total";
pub const EXECUTIONS_FAILED_TOTAL: &str = "executions_failed_total";
pub const NODES_SUCCEEDED_TOTAL: &str = "nodes_succeeded_total";
pub const NODES_FAILED_TOTAL: &str = "nodes_failed_total";
pub const ACTIONS_EXECUTED_TOTAL: &str = "actions_executed_total";
pub const ACTIONS_FAILED_TOTAL: &str = "actions_failed_total";
pub const ACTION_DURATION_SECONDS: &str = "action_duration_seconds";

/// Every metric this crate family knows how to name, for
/// enumeration-driven export.
pub const ALL: &[MetricDef] = &[
    MetricDef {
        name: EXECUTIONS_STARTED_TOTAL,
        kind: MetricKind::Counter,
        help: "Workflow executions started",
    },
    MetricDef {
        name: EXECUTIONS_SUCCEEDED_TOTAL,
        kind: MetricKind::Counter,
        help: "Workflow executions that completed successfully",
    },
    MetricDef {
        name: EXECUTIONS_FAILED_TOTAL,
        kind: MetricKind::Counter,
        help: "Workflow executions that ended in failure",
    },
    MetricDef {
        name: NODES_SUCCEEDED_TOTAL,
        kind: MetricKind::Counter,
        help: "Node executions that completed successfully",
    },
    MetricDef {
        name: NODES_FAILED_TOTAL,
        kind: MetricKind::Counter,
        help: "Node executions that ended in failure",
    },
    MetricDef {
        name: ACTIONS_EXECUTED_TOTAL,
        kind: MetricKind::Counter,
        help: "Actions dispatched by the runtime",
    },
    MetricDef {
        name: ACTIONS_FAILED_TOTAL,
        kind: MetricKind::Counter,
        help: "Actions that returned an error",
    },
    MetricDef {
        name: ACTION_DURATION_SECONDS,
        kind: MetricKind::Histogram,
        help: "Action execution time in seconds",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_def_name_matches_its_constant() {
        let names: Vec<&str> = ALL.iter().map(|def| def.name).collect();
        assert!(names.contains(&EXECUTIONS_STARTED_TOTAL));
        assert!(names.contains(&ACTION_DURATION_SECONDS));
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<&str> = ALL.iter().map(|def| def.name).collect();
        let before = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}
