//! Validators over `String`/`str` input.

use regex::Regex;

use crate::core::{Validate, ValidationComplexity, ValidationError, ValidatorMetadata};

/// Rejects an empty string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotEmpty;

impl Validate for NotEmpty {
    type Input = String;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        if input.is_empty() {
            Err(ValidationError::new("not_empty", "must not be empty"))
        } else {
            Ok(())
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::leaf("not_empty")
    }
}

/// Requires a minimum character length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinLength {
    min: usize,
}

impl MinLength {
    /// Require at least `min` characters.
    pub fn new(min: usize) -> Self {
        Self { min }
    }
}

impl Validate for MinLength {
    type Input = String;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        let len = input.chars().count();
        if len < self.min {
            Err(ValidationError::new(
                "min_length",
                format!("must be at least {} characters, got {len}", self.min),
            ))
        } else {
            Ok(())
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::leaf("min_length")
    }
}

/// Requires a maximum character length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxLength {
    max: usize,
}

impl MaxLength {
    /// Require at most `max` characters.
    pub fn new(max: usize) -> Self {
        Self { max }
    }
}

impl Validate for MaxLength {
    type Input = String;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        let len = input.chars().count();
        if len > self.max {
            Err(ValidationError::new(
                "max_length",
                format!("must be at most {} characters, got {len}", self.max),
            ))
        } else {
            Ok(())
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::leaf("max_length")
    }
}

/// Requires the input to match a compiled regular expression.
#[derive(Debug, Clone)]
pub struct Matches {
    pattern: Regex,
    label: String,
}

impl Matches {
    /// Compile `pattern`, labeling it `label` in error messages.
    pub fn new(pattern: &str, label: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            label: label.into(),
        })
    }
}

impl Validate for Matches {
    type Input = String;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        if self.pattern.is_match(input) {
            Ok(())
        } else {
            Err(ValidationError::new(
                "matches",
                format!("must match {}", self.label),
            ))
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::leaf("matches").with_complexity(ValidationComplexity::Moderate)
    }
}
