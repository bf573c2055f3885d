//! NOT combinator - logical negation of a validator.

use crate::core::{Validate, ValidationError, ValidatorMetadata};

/// Inverts a validator: passes when the inner validator fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Not<V> {
    inner: V,
}

impl<V> Not<V> {
    /// Negate `inner`.
    pub fn new(inner: V) -> Self {
        Self { inner }
    }
}

impl<V: Validate> Validate for Not<V> {
    type Input = V::Input;

    fn validate(&self, input: &Self::Input) -> Result<(), ValidationError> {
        match self.inner.validate(input) {
            Ok(()) => Err(ValidationError::new(
                "not",
                format!("must not satisfy {}", self.inner.metadata().name),
            )),
            Err(_) => Ok(()),
        }
    }

    fn metadata(&self) -> ValidatorMetadata {
        let inner_meta = self.inner.metadata();
        ValidatorMetadata {
            name: format!("Not({})", inner_meta.name).into(),
            description: Some(format!("must not satisfy {}", inner_meta.name).into()),
            complexity: inner_meta.complexity,
            cacheable: inner_meta.cacheable,
        }
    }
}
