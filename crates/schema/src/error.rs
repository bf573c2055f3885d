//! Schema errors.

use nebula_validator::ValidationError;

/// Errors raised while validating a JSON value against a [`crate::ParameterSchema`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// A required parameter had no value and no default.
    #[error("parameter '{0}' is required")]
    MissingRequired(String),

    /// The value's JSON type didn't match the schema's declared type.
    #[error("parameter '{name}' expected {expected}, got {actual}")]
    TypeMismatch {
        /// Parameter name.
        name: String,
        /// Expected type name.
        expected: &'static str,
        /// Actual JSON type name observed.
        actual: &'static str,
    },

    /// A constraint (length, range, pattern, ...) failed.
    #[error("parameter '{name}': {source}")]
    ConstraintFailed {
        /// Parameter name.
        name: String,
        /// The underlying validator failure.
        source: ValidationError,
    },
}

impl From<SchemaError> for nebula_error::NebulaError {
    fn from(err: SchemaError) -> Self {
        nebula_error::NebulaError::invalid_input(err.to_string())
    }
}
