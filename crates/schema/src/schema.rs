//! Parameter schema and validation against JSON values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use nebula_validator::{MaxLength, Min, Max, MinLength, OneOf, Validate};

use crate::error::SchemaError;

/// The declared JSON-level type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    /// UTF-8 text.
    String,
    /// A double-precision number.
    Number,
    /// `true`/`false`.
    Boolean,
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
    /// A string that must be wrapped in [`crate::SecretString`] once read;
    /// stored as plain JSON on the wire like any other string.
    Secret,
}

impl ParameterType {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String | Self::Secret => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Secret => "secret",
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Optional constraints layered on top of a [`ParameterType`]. Only the
/// constraints relevant to the declared type are applied; the rest are
/// ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterConstraints {
    /// Minimum string length / `None` for unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Minimum numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Maximum numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Closed set of allowed string values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<String>>,
}

/// A single parameter's schema: its type, whether it's required, a
/// default, and optional constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// The parameter's name (matches a key in a node's `configurations`).
    pub name: String,
    /// Declared type.
    pub param_type: ParameterType,
    /// Whether omitting the parameter (with no default) is an error.
    #[serde(default)]
    pub required: bool,
    /// Default value used when the parameter is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Human-readable description, surfaced in node catalogs.
    #[serde(default)]
    pub description: String,
    /// Optional constraints layered on top of `param_type`.
    #[serde(default)]
    pub constraints: ParameterConstraints,
}

impl ParameterSchema {
    /// Start building a schema for `name` with the given type.
    pub fn new(name: impl Into<String>, param_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: false,
            default: None,
            description: String::new(),
            constraints: ParameterConstraints::default(),
        }
    }

    /// Mark the parameter required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a default value.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach constraints.
    #[must_use]
    pub fn with_constraints(mut self, constraints: ParameterConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Resolve and validate a raw JSON value against this schema.
    ///
    /// Returns the value to use (the input, or the schema's default if the
    /// input was absent), or a [`SchemaError`] if validation fails.
    pub fn resolve(&self, value: Option<&Value>) -> Result<Value, SchemaError> {
        let value = match value {
            Some(v) => v.clone(),
            None => match &self.default {
                Some(d) => d.clone(),
                None if self.required => {
                    return Err(SchemaError::MissingRequired(self.name.clone()));
                }
                None => Value::Null,
            },
        };

        if value.is_null() {
            return Ok(value);
        }

        if !self.param_type.matches(&value) {
            return Err(SchemaError::TypeMismatch {
                name: self.name.clone(),
                expected: self.param_type.name(),
                actual: json_type_name(&value),
            });
        }

        self.apply_constraints(&value)?;
        Ok(value)
    }

    fn apply_constraints(&self, value: &Value) -> Result<(), SchemaError> {
        let err = |source| SchemaError::ConstraintFailed {
            name: self.name.clone(),
            source,
        };

        match self.param_type {
            ParameterType::String | ParameterType::Secret => {
                let s = value.as_str().unwrap_or_default().to_string();
                if let Some(min) = self.constraints.min_length {
                    MinLength::new(min).validate(&s).map_err(err)?;
                }
                if let Some(max) = self.constraints.max_length {
                    MaxLength::new(max).validate(&s).map_err(err)?;
                }
                if let Some(allowed) = &self.constraints.one_of {
                    OneOf::new(allowed.clone()).validate(&s).map_err(err)?;
                }
            }
            ParameterType::Number => {
                let n = value.as_f64().unwrap_or_default();
                if let Some(min) = self.constraints.min {
                    Min::new(min).validate(&n).map_err(err)?;
                }
                if let Some(max) = self.constraints.max {
                    Max::new(max).validate(&n).map_err(err)?;
                }
            }
            ParameterType::Boolean | ParameterType::Object | ParameterType::Array => {}
        }
        Ok(())
    }
}
