#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Error
//!
//! The single error type and closed [`ErrorKind`] taxonomy used by every
//! crate in the Nebula workflow engine. Every fallible operation that
//! crosses a crate boundary returns [`Result<T>`] (an alias for
//! `std::result::Result<T, NebulaError>`), so the engine, the credential
//! subsystem and every tool adapter can be composed without each crate
//! inventing its own error enum.
//!
//! ```rust
//! use nebula_error::{NebulaError, ErrorKind};
//!
//! let err = NebulaError::not_found("workflow `abc` does not exist");
//! assert_eq!(err.kind(), ErrorKind::NotFound);
//! assert!(!err.is_retryable());
//! ```

mod context;
mod convert;
mod error;
mod kinds;
mod retryable;

pub use context::ErrorContext;
pub use error::NebulaError;
pub use kinds::ErrorKind;
pub use retryable::Retryable;

#[cfg(feature = "derive")]
pub use nebula_error_macros::Retryable;

/// Result type used throughout the Nebula workspace.
pub type Result<T> = std::result::Result<T, NebulaError>;
