//! Dispatch for the `flow` node kind's subtypes: `if`, `switch`,
//! `filter`, `loop`, `merge`, `wait`.
//!
//! A flow node either produces a plain output value or, for the
//! branching subtypes, also names which of its outgoing output keys
//! stay live — the caller uses that to skip the rest.

use nebula_core::NodeId;
use nebula_error::NebulaError;
use nebula_expression::{EvaluationContext, ExpressionEngine};
use nebula_workflow::NodeDefinition;
use serde_json::Value;

/// The result of dispatching one `flow` node.
pub struct FlowOutcome {
    /// The node's own output value.
    pub output: Value,
    /// For branching subtypes, the output key(s) that remain live. Any
    /// outgoing connection whose `output_key` isn't in this set is
    /// treated as not taken. `None` means every outgoing connection is
    /// live (the non-branching subtypes).
    pub taken_branches: Option<Vec<String>>,
}

impl FlowOutcome {
    fn passthrough(output: Value) -> Self {
        Self { output, taken_branches: None }
    }
}

fn config_str<'a>(node: &'a NodeDefinition, key: &str) -> Option<&'a str> {
    node.configurations.get(key).and_then(Value::as_str)
}

fn evaluate(engine: &ExpressionEngine, source: &str, input: &Value) -> Result<Value, NebulaError> {
    let mut ctx = EvaluationContext::new();
    ctx.set_input(input.clone());
    engine.evaluate(source, &ctx).map_err(|err| NebulaError::sandbox_error(err.to_string()))
}

/// Dispatch one `flow` node given its merged input.
pub fn dispatch_flow(engine: &ExpressionEngine, node: &NodeDefinition, input: Value) -> Result<FlowOutcome, NebulaError> {
    match node.key.subtype() {
        "if" => dispatch_if(engine, node, input),
        "switch" => dispatch_switch(engine, node, input),
        "filter" => dispatch_filter(engine, node, input),
        "loop" => dispatch_loop(engine, node, input),
        "merge" => Ok(FlowOutcome::passthrough(input)),
        "wait" => Ok(FlowOutcome::passthrough(input)),
        other => Err(NebulaError::invalid_workflow(format!("unknown flow subtype: {other}"))),
    }
}

fn dispatch_if(engine: &ExpressionEngine, node: &NodeDefinition, input: Value) -> Result<FlowOutcome, NebulaError> {
    let condition = config_str(node, "condition").ok_or_else(|| NebulaError::invalid_workflow("if node missing `condition`"))?;
    let result = evaluate(engine, condition, &input)?;
    let chosen = if is_truthy(&result) { "true" } else { "false" };
    Ok(FlowOutcome { output: input, taken_branches: Some(vec![chosen.to_string()]) })
}

fn dispatch_switch(engine: &ExpressionEngine, node: &NodeDefinition, input: Value) -> Result<FlowOutcome, NebulaError> {
    let expression = config_str(node, "expression").ok_or_else(|| NebulaError::invalid_workflow("switch node missing `expression`"))?;
    let result = evaluate(engine, expression, &input)?;
    let chosen = match &result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    Ok(FlowOutcome { output: input, taken_branches: Some(vec![chosen]) })
}

fn dispatch_filter(engine: &ExpressionEngine, node: &NodeDefinition, input: Value) -> Result<FlowOutcome, NebulaError> {
    let predicate = config_str(node, "predicate").ok_or_else(|| NebulaError::invalid_workflow("filter node missing `predicate`"))?;
    let items = input.as_array().cloned().unwrap_or_else(|| vec![input.clone()]);
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        if is_truthy(&evaluate(engine, predicate, &item)?) {
            kept.push(item);
        }
    }
    Ok(FlowOutcome::passthrough(Value::Array(kept)))
}

/// Applies `expression` to each item of the input collection.
///
/// This is a reduced form of the full "iterate a body sub-DAG per item"
/// behavior: [`NodeDefinition`] carries no reference to a nested body
/// graph, so there is nothing here for a loop node to invoke beyond its
/// own configured expression. A faithful sub-DAG loop would need the
/// workflow format to name a body subgraph per loop node.
fn dispatch_loop(engine: &ExpressionEngine, node: &NodeDefinition, input: Value) -> Result<FlowOutcome, NebulaError> {
    let items = input.as_array().cloned().unwrap_or_else(|| vec![input.clone()]);
    let expression = config_str(node, "expression");
    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let mapped = match expression {
            Some(source) => evaluate(engine, source, &item)?,
            None => item,
        };
        results.push(mapped);
    }
    Ok(FlowOutcome::passthrough(Value::Array(results)))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Build the node used in tests below without pulling in the workflow
/// crate's own test helpers.
#[cfg(test)]
fn flow_node(id: NodeId, subtype: &str) -> NodeDefinition {
    NodeDefinition::new(id, "n", nebula_core::NodeKey::new("flow", subtype))
}
