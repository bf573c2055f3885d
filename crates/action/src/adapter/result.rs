//! The uniform result shape every tool adapter call returns.

use std::collections::HashMap;

use serde_json::Value;

/// Outcome of one `ToolAdapter::call`.
#[derive(Debug, Clone)]
pub struct ToolCallResult {
    /// Whether the call succeeded.
    pub success: bool,
    /// Response payload on success.
    pub data: Option<Value>,
    /// Error on failure.
    pub error: Option<nebula_error::NebulaError>,
    /// Wall-clock time spent on the call, including retries.
    pub execution_time_ms: u64,
    /// Adapter-specific metadata (e.g. rate-limit headroom, pagination
    /// cursors).
    pub metadata: HashMap<String, Value>,
}

impl ToolCallResult {
    /// Build a success result.
    pub fn success(data: Value, execution_time_ms: u64) -> Self {
        Self { success: true, data: Some(data), error: None, execution_time_ms, metadata: HashMap::new() }
    }

    /// Build a failure result.
    pub fn failure(error: nebula_error::NebulaError, execution_time_ms: u64) -> Self {
        Self { success: false, data: None, error: Some(error), execution_time_ms, metadata: HashMap::new() }
    }

    /// Attach metadata, chained.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
