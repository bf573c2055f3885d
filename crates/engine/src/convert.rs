//! Edge evaluation: output-key extraction, the conversion function
//! sandbox, and fan-in merge into a downstream node's accumulated input.

use nebula_core::NodeId;
use nebula_expression::{EvaluationContext, ExpressionEngine};
use serde_json::Value;

/// Extract the slot a connection carries from an upstream node's raw
/// output.
///
/// A default-keyed connection ("result") against a non-object output
/// falls back to the whole value, rather than failing — most node
/// outputs are scalars or arrays, and the default key only matters when
/// an upstream action deliberately produces a multi-key object.
#[must_use]
pub fn extract_output_slot(output: &Value, output_key: &str) -> Value {
    match output {
        Value::Object(map) => map.get(output_key).cloned().unwrap_or_else(|| output.clone()),
        other => other.clone(),
    }
}

/// Run a connection's conversion function over an extracted value.
///
/// On any parse/evaluation failure, returns `value` unchanged (spec's
/// failure policy: a broken conversion function degrades to identity
/// rather than failing the edge) and logs a warning.
///
/// The function's `$input` is the bare extracted value, not a wrapped
/// `{output_key, meta}` envelope — that matches the identity source's
/// own contract (`$input` evaluates to the input unchanged) and keeps
/// the common no-transformation case a true passthrough.
pub fn apply_conversion(engine: &ExpressionEngine, source: &str, value: Value, from_node: NodeId) -> Value {
    let mut ctx = EvaluationContext::new();
    ctx.set_input(value.clone());
    match engine.evaluate(source, &ctx) {
        Ok(converted) => wrap_non_mapping(converted),
        Err(err) => {
            tracing::warn!(%from_node, %source, error = %err, "conversion function failed, passing edge value through unchanged");
            value
        }
    }
}

/// Return-type policy: a conversion function that doesn't return a JSON
/// object gets wrapped so downstream nodes always see a mapping under
/// `converted_data`.
fn wrap_non_mapping(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        other => serde_json::json!({ "converted_data": other }),
    }
}

/// Accumulates a downstream node's input across however many inbound
/// connections fire for one dispatch of that node.
///
/// Per spec: last write to a given output key wins, but writes that land
/// on the same key in the same accumulation pass (the normal fan-in
/// case — several upstream branches feeding the same join node) are
/// concatenated into a list, in the order they were merged.
#[derive(Debug, Default, Clone)]
pub struct InputAccumulator {
    fields: serde_json::Map<String, Value>,
}

impl InputAccumulator {
    /// An empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one connection's converted value under its output key.
    pub fn merge(&mut self, output_key: &str, value: Value) {
        match self.fields.get_mut(output_key) {
            Some(existing) => {
                if let Value::Array(items) = existing {
                    items.push(value);
                } else {
                    let previous = existing.take();
                    *existing = Value::Array(vec![previous, value]);
                }
            }
            None => {
                self.fields.insert(output_key.to_string(), value);
            }
        }
    }

    /// Consume the accumulator into the merged input value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Whether any connection has written into this accumulator.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The downstream payload a `continue_regular` error policy passes for
/// the failed node's output key: an empty mapping.
#[must_use]
pub fn continue_regular_payload() -> Value {
    serde_json::json!({})
}

/// The downstream payload a `continue_error` error policy passes for the
/// failed node's output key.
#[must_use]
pub fn continue_error_payload(message: &str) -> Value {
    serde_json::json!({ "error": { "message": message } })
}
