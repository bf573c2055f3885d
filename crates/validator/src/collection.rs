//! Validators over collections and enumerations.

use crate::core::{Validate, ValidationError, ValidatorMetadata};

/// Requires the input to be one of a fixed set of allowed strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOf {
    allowed: Vec<String>,
}

impl OneOf {
    /// Restrict input to `allowed`.
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }
}

impl Validate for OneOf {
    type Input = String;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        if self.allowed.iter().any(|a| a == input) {
            Ok(())
        } else {
            Err(ValidationError::new(
                "one_of",
                format!("must be one of {:?}, got {input:?}", self.allowed),
            ))
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::leaf("one_of")
    }
}
