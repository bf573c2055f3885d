//! `From` impls turning common upstream error types into [`NebulaError`].

use crate::error::NebulaError;

impl From<std::io::Error> for NebulaError {
    fn from(err: std::io::Error) -> Self {
        NebulaError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for NebulaError {
    fn from(err: serde_json::Error) -> Self {
        NebulaError::invalid_input(err.to_string())
    }
}
