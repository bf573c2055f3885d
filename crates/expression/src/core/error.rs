//! Re-exports for expression error types.

pub use crate::error::{ExpressionError, ExpressionErrorExt, ExpressionResult};
