//! Minimal error type owned by `nebula-core` itself.
//!
//! Most crates use `nebula-error`'s richer taxonomy; this crate only needs
//! to report malformed identifiers and keys without depending upward on
//! `nebula-error`.

use thiserror::Error;

/// Errors produced by `nebula-core`'s own operations (id/key parsing).
#[derive(Debug, Error)]
pub enum CoreError {
    /// A typed identifier could not be parsed from the given string.
    #[error("invalid identifier `{value}`: {source}")]
    InvalidId {
        /// The string that failed to parse.
        value: String,
        /// The underlying UUID parse error.
        #[source]
        source: crate::id::UuidParseError,
    },
}
