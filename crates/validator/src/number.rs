//! Validators over numeric (`f64`) input.

use crate::core::{Validate, ValidationError, ValidatorMetadata};

/// Requires a value greater than or equal to `min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Min {
    min: f64,
}

impl Min {
    /// Require `input >= min`.
    pub fn new(min: f64) -> Self {
        Self { min }
    }
}

impl Validate for Min {
    type Input = f64;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        if *input < self.min {
            Err(ValidationError::new(
                "min",
                format!("must be at least {}, got {input}", self.min),
            ))
        } else {
            Ok(())
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::leaf("min")
    }
}

/// Requires a value less than or equal to `max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Max {
    max: f64,
}

impl Max {
    /// Require `input <= max`.
    pub fn new(max: f64) -> Self {
        Self { max }
    }
}

impl Validate for Max {
    type Input = f64;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        if *input > self.max {
            Err(ValidationError::new(
                "max",
                format!("must be at most {}, got {input}", self.max),
            ))
        } else {
            Ok(())
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::leaf("max")
    }
}

/// Requires a value within an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    min: f64,
    max: f64,
}

impl Range {
    /// Require `min <= input <= max`.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Validate for Range {
    type Input = f64;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        if *input < self.min || *input > self.max {
            Err(ValidationError::new(
                "range",
                format!("must be between {} and {}, got {input}", self.min, self.max),
            ))
        } else {
            Ok(())
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        ValidatorMetadata::leaf("range")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_boundary() {
        let v = Min::new(5.0);
        assert!(v.validate(&4.9).is_err());
        assert!(v.validate(&5.0).is_ok());
    }

    #[test]
    fn max_boundary() {
        let v = Max::new(5.0);
        assert!(v.validate(&5.0).is_ok());
        assert!(v.validate(&5.1).is_err());
    }

    #[test]
    fn range_inclusive() {
        let v = Range::new(1.0, 10.0);
        assert!(v.validate(&1.0).is_ok());
        assert!(v.validate(&10.0).is_ok());
        assert!(v.validate(&0.0).is_err());
        assert!(v.validate(&10.1).is_err());
    }
}
