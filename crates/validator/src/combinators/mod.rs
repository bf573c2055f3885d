//! Combinators that compose validators into larger rules.

mod and;
mod not;
mod or;

pub use and::And;
pub use not::Not;
pub use or::Or;

/// Extension trait adding `.and()`/`.or()`/`.not()` combinator methods to
/// any [`crate::core::Validate`] implementor.
pub trait ValidateExt: crate::core::Validate + Sized {
    /// Require both `self` and `other` to pass.
    fn and<V>(self, other: V) -> And<Self, V>
    where
        V: crate::core::Validate<Input = Self::Input>,
    {
        And::new(self, other)
    }

    /// Require either `self` or `other` to pass.
    fn or<V>(self, other: V) -> Or<Self, V>
    where
        V: crate::core::Validate<Input = Self::Input>,
    {
        Or::new(self, other)
    }

    /// Negate this validator.
    fn not(self) -> Not<Self> {
        Not::new(self)
    }
}

impl<T: crate::core::Validate> ValidateExt for T {}
