//! Expression evaluation errors.

use nebula_error::NebulaError;

/// Everything that can go wrong while parsing or evaluating an expression
/// or rendering a template.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExpressionError {
    /// A generic evaluation failure with a human-readable message.
    #[error("{0}")]
    Eval(String),
    /// A `$name` reference had no binding in the evaluation context.
    #[error("variable not found: {0}")]
    VariableNotFound(String),
    /// An operand or argument had the wrong runtime type.
    #[error("type error: expected {expected}, got {actual}")]
    Type {
        /// What was expected.
        expected: String,
        /// What was actually found.
        actual: String,
    },
    /// Division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// A regex pattern failed to compile, was rejected as unsafe, or was
    /// too long.
    #[error("regex error: {0}")]
    Regex(String),
    /// A builtin function was called with the wrong number or shape of
    /// arguments.
    #[error("invalid argument to '{func}': {message}")]
    InvalidArgument {
        /// The function name.
        func: String,
        /// What was wrong.
        message: String,
    },
    /// An array index was out of bounds.
    #[error("index {index} out of bounds (length {len})")]
    IndexOutOfBounds {
        /// The index that was requested.
        index: usize,
        /// The array's actual length.
        len: usize,
    },
    /// The expression or template source failed to parse.
    #[error("parse error: {0}")]
    Parse(String),
    /// A function call referenced a name with no registered builtin.
    #[error("unknown function: {0}")]
    FunctionNotFound(String),
}

/// Constructors for [`ExpressionError`], implemented as a trait so call
/// sites can write `ExpressionError::expression_type_error(...)` with the
/// trait merely imported, without an explicit `<ExpressionError as
/// ExpressionErrorExt>::` qualification.
pub trait ExpressionErrorExt: Sized {
    /// A generic evaluation failure.
    fn expression_eval_error(message: impl Into<String>) -> Self;
    /// An unresolved `$name` reference.
    fn expression_variable_not_found(name: impl Into<String>) -> Self;
    /// A type mismatch.
    fn expression_type_error(expected: impl Into<String>, actual: impl Into<String>) -> Self;
    /// Division or modulo by zero.
    fn expression_division_by_zero() -> Self;
    /// A regex compile/safety failure.
    fn expression_regex_error(message: impl Into<String>) -> Self;
    /// A malformed argument to a builtin function.
    fn expression_invalid_argument(func: impl Into<String>, message: impl Into<String>) -> Self;
    /// An out-of-bounds array index.
    fn expression_index_out_of_bounds(index: usize, len: usize) -> Self;
    /// A source parse failure.
    fn expression_parse_error(message: impl Into<String>) -> Self;
    /// A call to an unregistered function name.
    fn expression_function_not_found(name: impl Into<String>) -> Self;
}

impl ExpressionErrorExt for ExpressionError {
    fn expression_eval_error(message: impl Into<String>) -> Self {
        Self::Eval(message.into())
    }

    fn expression_variable_not_found(name: impl Into<String>) -> Self {
        Self::VariableNotFound(name.into())
    }

    fn expression_type_error(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Type {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    fn expression_division_by_zero() -> Self {
        Self::DivisionByZero
    }

    fn expression_regex_error(message: impl Into<String>) -> Self {
        Self::Regex(message.into())
    }

    fn expression_invalid_argument(func: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            func: func.into(),
            message: message.into(),
        }
    }

    fn expression_index_out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }

    fn expression_parse_error(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    fn expression_function_not_found(name: impl Into<String>) -> Self {
        Self::FunctionNotFound(name.into())
    }
}

/// Convenience alias used throughout this crate.
pub type ExpressionResult<T> = Result<T, ExpressionError>;

impl From<ExpressionError> for NebulaError {
    fn from(err: ExpressionError) -> Self {
        NebulaError::sandbox_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_error_message_includes_both_sides() {
        let err = ExpressionError::expression_type_error("string", "number");
        assert_eq!(err.to_string(), "type error: expected string, got number");
    }

    #[test]
    fn converts_into_nebula_error_as_sandbox_kind() {
        let err: NebulaError = ExpressionError::expression_division_by_zero().into();
        assert_eq!(err.kind(), nebula_error::ErrorKind::SandboxError);
    }
}
