#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Schema
//!
//! Schema and secret-value types shared across the Nebula workflow engine:
//!
//! - [`ParameterType`]/[`ParameterSchema`]/[`ParameterConstraints`] — declare
//!   a parameter's JSON type, required-ness, default, and constraints, and
//!   resolve a raw value against it using `nebula-validator` checks.
//! - [`SecretString`]/[`SecureBytes`] — zeroizing, redacting wrappers used
//!   anywhere a credential, token, or key passes through in-process.

mod error;
mod schema;
mod secret;

pub use error::SchemaError;
pub use schema::{ParameterConstraints, ParameterSchema, ParameterType};
pub use secret::{SecretString, SecureBytes};
