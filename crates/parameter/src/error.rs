//! Parameter merge errors.

use nebula_expression::ExpressionError;
use nebula_schema::SchemaError;

/// Errors raised while resolving a node's effective parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    /// The raw value failed schema validation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A template default failed to render.
    #[error("rendering template default for parameter '{name}': {source}")]
    TemplateDefault {
        /// Parameter name.
        name: String,
        /// Underlying expression error.
        #[source]
        source: ExpressionError,
    },
}

impl From<ParameterError> for nebula_error::NebulaError {
    fn from(err: ParameterError) -> Self {
        match &err {
            ParameterError::Schema(_) => nebula_error::NebulaError::invalid_input(err.to_string()),
            ParameterError::TemplateDefault { .. } => {
                nebula_error::NebulaError::invalid_input(err.to_string())
            }
        }
    }
}
