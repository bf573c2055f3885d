//! The core validation trait and supporting types.

use std::borrow::Cow;

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the rule that failed (matches [`ValidatorMetadata::name`]).
    pub rule: Cow<'static, str>,
    /// Human-readable failure description.
    pub message: String,
}

impl ValidationError {
    /// Build a validation error for the given rule name.
    pub fn new(rule: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for nebula_error::NebulaError {
    fn from(err: ValidationError) -> Self {
        nebula_error::NebulaError::invalid_input(err.to_string())
    }
}

/// Relative cost of evaluating a validator, used to order checks so cheap
/// ones run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationComplexity {
    /// A plain comparison or length check.
    Trivial,
    /// A regex match or small allocation.
    Moderate,
    /// Anything that touches I/O or runs a sub-evaluator.
    Expensive,
}

/// Descriptive metadata about a validator, used for error messages and
/// introspection (e.g. rendering a parameter's constraints in a UI).
#[derive(Debug, Clone)]
pub struct ValidatorMetadata {
    /// Rule name, e.g. `"not_empty"` or `"And(min_length, matches)"`.
    pub name: Cow<'static, str>,
    /// Optional human-readable description.
    pub description: Option<Cow<'static, str>>,
    /// Relative evaluation cost.
    pub complexity: ValidationComplexity,
    /// Whether the result may be cached for identical inputs.
    pub cacheable: bool,
}

impl ValidatorMetadata {
    /// Build metadata for a leaf (non-combinator) validator.
    pub fn leaf(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            description: None,
            complexity: ValidationComplexity::Trivial,
            cacheable: true,
        }
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the complexity tier.
    #[must_use]
    pub fn with_complexity(mut self, complexity: ValidationComplexity) -> Self {
        self.complexity = complexity;
        self
    }
}

/// A validator over a single input type.
///
/// Implementors check one rule; combine rules with [`crate::combinators`]
/// (`and`, `or`, `not`) rather than writing monolithic validators.
pub trait Validate {
    /// The type this validator checks.
    type Input;

    /// Run the check, returning the first failure if any.
    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError>;

    /// Descriptive metadata about this validator.
    fn metadata(&self) -> ValidatorMetadata;
}
