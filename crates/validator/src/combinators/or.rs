//! OR combinator - logical disjunction of validators.

use crate::core::{Validate, ValidationError, ValidatorMetadata};

/// Combines two validators with logical OR: at least one must pass.
///
/// On failure, the error from `right` is reported (the assumption being
/// `right` is the more specific / preferred branch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Or<L, R> {
    left: L,
    right: R,
}

impl<L, R> Or<L, R> {
    /// Combine `left` and `right`.
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<L, R> Validate for Or<L, R>
where
    L: Validate,
    R: Validate<Input = L::Input>,
{
    type Input = L::Input;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        if self.left.validate(input).is_ok() {
            return Ok(());
        }
        self.right.validate(input)
    }

    fn metadata(&self) -> ValidatorMetadata {
        let left_meta = self.left.metadata();
        let right_meta = self.right.metadata();
        let complexity = std::cmp::max(left_meta.complexity, right_meta.complexity);

        ValidatorMetadata {
            name: format!("Or({}, {})", left_meta.name, right_meta.name).into(),
            description: Some(
                format!("either {} or {} must pass", left_meta.name, right_meta.name).into(),
            ),
            complexity,
            cacheable: left_meta.cacheable && right_meta.cacheable,
        }
    }
}
