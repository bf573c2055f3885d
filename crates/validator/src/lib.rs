#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Validator
//!
//! A small composable validation framework: a [`Validate`] trait, logical
//! combinators (`and`/`or`/`not`), and a set of concrete validators for the
//! string and numeric parameter values used throughout the Nebula workflow
//! engine.

pub mod collection;
pub mod combinators;
pub mod core;
pub mod number;
pub mod string;

pub use collection::OneOf;
pub use combinators::{And, Not, Or, ValidateExt};
pub use core::{ValidationComplexity, ValidationError, Validate, ValidatorMetadata};
pub use number::{Max, Min, Range};
pub use string::{Matches, MaxLength, MinLength, NotEmpty};
