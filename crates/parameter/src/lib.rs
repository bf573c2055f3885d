#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Parameter
//!
//! Owns the typed merge rule over a node's raw `configurations`/
//! `input_params` JSON maps (defined in `nebula-workflow`'s
//! `NodeDefinition`): for each parameter a node type declares in its
//! [`collection::ParameterCollection`], the effective value is the first
//! non-empty of `configurations`, `input_params`, or the schema's
//! (possibly templated) default.
//!
//! "Empty" has a precise meaning here (see [`merge::is_empty_value`]):
//! `null`, an empty string, an empty array/object, or the literal
//! placeholder `"{{$placeholder}}"` a node editor leaves on an unfilled
//! field.

pub mod collection;
pub mod error;
pub mod merge;

pub use collection::ParameterCollection;
pub use error::ParameterError;
pub use merge::{is_empty_value, merge_all, resolve_parameter, EMPTY_PLACEHOLDER};
