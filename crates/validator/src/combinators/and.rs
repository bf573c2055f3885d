//! AND combinator - logical conjunction of validators.

use crate::core::{Validate, ValidationError, ValidatorMetadata};

/// Combines two validators with logical AND: both must pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct And<L, R> {
    left: L,
    right: R,
}

impl<L, R> And<L, R> {
    /// Combine `left` and `right`.
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<L, R> Validate for And<L, R>
where
    L: Validate,
    R: Validate<Input = L::Input>,
{
    type Input = L::Input;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        self.left.validate(input)?;
        self.right.validate(input)?;
        Ok(())
    }

    fn metadata(&self) -> ValidatorMetadata {
        let left_meta = self.left.metadata();
        let right_meta = self.right.metadata();
        let complexity = std::cmp::max(left_meta.complexity, right_meta.complexity);
        let cacheable = left_meta.cacheable && right_meta.cacheable;

        ValidatorMetadata {
            name: format!("And({}, {})", left_meta.name, right_meta.name).into(),
            description: Some(
                format!("both {} and {} must pass", left_meta.name, right_meta.name).into(),
            ),
            complexity,
            cacheable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string::{MaxLength, MinLength};

    #[test]
    fn both_pass() {
        let v = And::new(MinLength::new(2), MaxLength::new(5));
        assert!(v.validate(&"abc".to_string()).is_ok());
    }

    #[test]
    fn left_fails_short_circuits() {
        let v = And::new(MinLength::new(10), MaxLength::new(1));
        let err = v.validate(&"abc".to_string()).unwrap_err();
        assert_eq!(err.rule, "min_length");
    }

    #[test]
    fn metadata_combines_names() {
        let v = And::new(MinLength::new(2), MaxLength::new(5));
        assert_eq!(v.metadata().name, "And(min_length, max_length)");
    }
}
