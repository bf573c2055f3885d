//! Miscellaneous type-inspection and utility functions.

use super::check_arg_count;
use crate::ExpressionError;
use crate::context::EvaluationContext;
use crate::core::error::{ExpressionErrorExt, ExpressionResult};
use crate::eval::Evaluator;
use serde_json::Value;

/// `length(x)`: string length in chars, array length, or object key count.
pub fn length(
    args: &[Value],
    _eval: &Evaluator,
    _ctx: &EvaluationContext,
) -> ExpressionResult<Value> {
    check_arg_count("length", args, 1)?;

    let len = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(a) => a.len(),
        Value::Object(o) => o.len(),
        other => {
            return Err(ExpressionError::expression_type_error(
                "string, array, or object",
                crate::value_utils::value_type_name(other),
            ));
        }
    };

    Ok(Value::Number(len.into()))
}

/// `is_null(x)`.
pub fn is_null(
    args: &[Value],
    _eval: &Evaluator,
    _ctx: &EvaluationContext,
) -> ExpressionResult<Value> {
    check_arg_count("is_null", args, 1)?;
    Ok(Value::Bool(args[0].is_null()))
}

/// `is_array(x)`.
pub fn is_array(
    args: &[Value],
    _eval: &Evaluator,
    _ctx: &EvaluationContext,
) -> ExpressionResult<Value> {
    check_arg_count("is_array", args, 1)?;
    Ok(Value::Bool(args[0].is_array()))
}

/// `is_object(x)`.
pub fn is_object(
    args: &[Value],
    _eval: &Evaluator,
    _ctx: &EvaluationContext,
) -> ExpressionResult<Value> {
    check_arg_count("is_object", args, 1)?;
    Ok(Value::Bool(args[0].is_object()))
}

/// `is_string(x)`.
pub fn is_string(
    args: &[Value],
    _eval: &Evaluator,
    _ctx: &EvaluationContext,
) -> ExpressionResult<Value> {
    check_arg_count("is_string", args, 1)?;
    Ok(Value::Bool(args[0].is_string()))
}

/// `is_number(x)`.
pub fn is_number(
    args: &[Value],
    _eval: &Evaluator,
    _ctx: &EvaluationContext,
) -> ExpressionResult<Value> {
    check_arg_count("is_number", args, 1)?;
    Ok(Value::Bool(args[0].is_number()))
}

/// `uuid()`: a fresh random v4 UUID, string-formatted.
#[cfg(feature = "uuid")]
pub fn uuid(
    args: &[Value],
    _eval: &Evaluator,
    _ctx: &EvaluationContext,
) -> ExpressionResult<Value> {
    check_arg_count("uuid", args, 0)?;
    Ok(Value::String(uuid::Uuid::new_v4().to_string()))
}

#[cfg(not(feature = "uuid"))]
pub fn uuid(
    _args: &[Value],
    _eval: &Evaluator,
    _ctx: &EvaluationContext,
) -> ExpressionResult<Value> {
    Err(ExpressionError::expression_eval_error(
        "uuid() is not enabled (feature 'uuid' not enabled)",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EvaluationContext;

    fn ctx() -> EvaluationContext {
        EvaluationContext::new()
    }

    fn eval() -> Evaluator {
        Evaluator::new(std::sync::Arc::new(super::super::BuiltinRegistry::new()))
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        let args = vec![Value::String("héllo".to_string())];
        let result = length(&args, &eval(), &ctx()).unwrap();
        assert_eq!(result.as_i64(), Some(5));
    }

    #[test]
    fn length_rejects_numbers() {
        let args = vec![Value::Number(1.into())];
        assert!(length(&args, &eval(), &ctx()).is_err());
    }

    #[test]
    fn is_null_detects_null_only() {
        assert_eq!(
            is_null(&[Value::Null], &eval(), &ctx()).unwrap().as_bool(),
            Some(true)
        );
        assert_eq!(
            is_null(&[Value::Bool(false)], &eval(), &ctx())
                .unwrap()
                .as_bool(),
            Some(false)
        );
    }

    #[test]
    fn uuid_produces_a_parseable_v4() {
        let result = uuid(&[], &eval(), &ctx()).unwrap();
        let s = result.as_str().unwrap();
        assert!(uuid::Uuid::parse_str(s).is_ok());
    }
}
