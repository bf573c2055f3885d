//! The parameter merge rule: `configurations > input_params > template_default`.

use std::collections::HashMap;

use nebula_expression::{EvaluationContext, ExpressionEngine, MaybeTemplate};
use serde_json::Value;

use crate::collection::ParameterCollection;
use crate::error::ParameterError;

/// The literal placeholder a node editor writes for an unfilled parameter.
pub const EMPTY_PLACEHOLDER: &str = "{{$placeholder}}";

/// Whether `value` counts as "empty" for the purposes of the parameter
/// merge rule: `null`, an empty string, an empty array/object, or the
/// literal placeholder string.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty() || s == EMPTY_PLACEHOLDER,
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Resolve the effective value of a single parameter, given its raw
/// `configurations`/`input_params` maps and its schema (for the template
/// default tier).
///
/// Precedence: first non-empty of `configurations[name]`,
/// `input_params[name]`, the schema's (possibly templated) default.
pub fn resolve_parameter(
    name: &str,
    configurations: &HashMap<String, Value>,
    input_params: &HashMap<String, Value>,
    collection: &ParameterCollection,
    engine: &ExpressionEngine,
    context: &EvaluationContext,
) -> Result<Value, ParameterError> {
    if let Some(v) = configurations.get(name) {
        if !is_empty_value(v) {
            return Ok(v.clone());
        }
    }
    if let Some(v) = input_params.get(name) {
        if !is_empty_value(v) {
            return Ok(v.clone());
        }
    }

    let schema = collection.get(name);
    let default = match schema {
        Some(s) => s.resolve(None)?,
        None => Value::Null,
    };

    render_template_default(name, default, engine, context)
}

/// If `default` is a string containing `{{ }}` template syntax, render it
/// through the expression engine; otherwise return it unchanged.
fn render_template_default(
    name: &str,
    default: Value,
    engine: &ExpressionEngine,
    context: &EvaluationContext,
) -> Result<Value, ParameterError> {
    let Value::String(s) = &default else {
        return Ok(default);
    };
    let template = MaybeTemplate::from_string(s.clone());
    if !template.is_template() {
        return Ok(default);
    }

    let rendered = template
        .resolve(engine, context)
        .map_err(|source| ParameterError::TemplateDefault {
            name: name.to_string(),
            source,
        })?;

    Ok(serde_json::from_str(&rendered).unwrap_or(Value::String(rendered)))
}

/// Resolve every parameter declared in `collection` against the given raw
/// maps, producing the node's full effective parameter set.
///
/// Idempotent: re-running this against the same `configurations`/
/// `input_params`/`collection` triple always produces the same map, in
/// the same key order as `collection`.
pub fn merge_all(
    configurations: &HashMap<String, Value>,
    input_params: &HashMap<String, Value>,
    collection: &ParameterCollection,
    engine: &ExpressionEngine,
    context: &EvaluationContext,
) -> Result<HashMap<String, Value>, ParameterError> {
    let mut out = HashMap::with_capacity(collection.len());
    for schema in collection.iter() {
        let value = resolve_parameter(
            &schema.name,
            configurations,
            input_params,
            collection,
            engine,
            context,
        )?;
        out.insert(schema.name.clone(), value);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_schema::ParameterType;
    use serde_json::json;

    fn engine_ctx() -> (ExpressionEngine, EvaluationContext) {
        (ExpressionEngine::new(), EvaluationContext::new())
    }

    fn collection() -> ParameterCollection {
        let mut c = ParameterCollection::new();
        c.push(
            ParameterSchemaBuilder::new("channel")
                .with_default(json!("#general"))
                .build(),
        );
        c
    }

    // Small local helper so tests read cleanly without importing the
    // builder pattern from nebula-schema directly in every case.
    struct ParameterSchemaBuilder(nebula_schema::ParameterSchema);
    impl ParameterSchemaBuilder {
        fn new(name: &str) -> Self {
            Self(nebula_schema::ParameterSchema::new(
                name,
                ParameterType::String,
            ))
        }
        fn with_default(mut self, v: Value) -> Self {
            self.0.default = Some(v);
            self
        }
        fn build(self) -> nebula_schema::ParameterSchema {
            self.0
        }
    }

    #[test]
    fn is_empty_recognizes_placeholder() {
        assert!(is_empty_value(&json!(null)));
        assert!(is_empty_value(&json!("")));
        assert!(is_empty_value(&json!(EMPTY_PLACEHOLDER)));
        assert!(is_empty_value(&json!([])));
        assert!(is_empty_value(&json!({})));
        assert!(!is_empty_value(&json!("x")));
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(false)));
    }

    #[test]
    fn configurations_take_precedence() {
        let (engine, ctx) = engine_ctx();
        let mut configs = HashMap::new();
        configs.insert("channel".into(), json!("#eng"));
        let inputs = HashMap::new();
        let c = collection();

        let v = resolve_parameter("channel", &configs, &inputs, &c, &engine, &ctx).unwrap();
        assert_eq!(v, json!("#eng"));
    }

    #[test]
    fn falls_back_to_input_when_configuration_empty() {
        let (engine, ctx) = engine_ctx();
        let mut configs = HashMap::new();
        configs.insert("channel".into(), json!(""));
        let mut inputs = HashMap::new();
        inputs.insert("channel".into(), json!("#from-input"));
        let c = collection();

        let v = resolve_parameter("channel", &configs, &inputs, &c, &engine, &ctx).unwrap();
        assert_eq!(v, json!("#from-input"));
    }

    #[test]
    fn falls_back_to_placeholder_then_default() {
        let (engine, ctx) = engine_ctx();
        let mut configs = HashMap::new();
        configs.insert("channel".into(), json!(EMPTY_PLACEHOLDER));
        let inputs = HashMap::new();
        let c = collection();

        let v = resolve_parameter("channel", &configs, &inputs, &c, &engine, &ctx).unwrap();
        assert_eq!(v, json!("#general"));
    }

    #[test]
    fn merge_is_idempotent() {
        let (engine, ctx) = engine_ctx();
        let mut configs = HashMap::new();
        configs.insert("channel".into(), json!("#eng"));
        let inputs = HashMap::new();
        let c = collection();

        let first = merge_all(&configs, &inputs, &c, &engine, &ctx).unwrap();
        let second = merge_all(&configs, &inputs, &c, &engine, &ctx).unwrap();
        assert_eq!(first, second);
    }
}
