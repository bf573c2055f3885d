//! Runtime error types.

/// Errors from the runtime layer.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// No action is registered for the given node key.
    #[error("action not found: {key}")]
    ActionNotFound {
        /// The node key that was looked up.
        key: String,
    },

    /// No tool adapter is registered for the given provider.
    #[error("adapter not found for provider: {provider}")]
    AdapterNotFound {
        /// The provider that was looked up.
        provider: String,
    },

    /// The action's output exceeded the data passing policy's size limit.
    #[error("data limit exceeded: {actual_bytes} bytes > {limit_bytes} bytes")]
    DataLimitExceeded {
        /// Maximum allowed output size.
        limit_bytes: u64,
        /// Actual output size.
        actual_bytes: u64,
    },
}

impl From<RuntimeError> for nebula_error::NebulaError {
    fn from(err: RuntimeError) -> Self {
        match err {
            RuntimeError::ActionNotFound { key } => nebula_error::NebulaError::not_found(format!("action not found: {key}")),
            RuntimeError::AdapterNotFound { provider } => nebula_error::NebulaError::not_found(format!("adapter not found for provider: {provider}")),
            RuntimeError::DataLimitExceeded { limit_bytes, actual_bytes } => {
                nebula_error::NebulaError::invalid_input(format!("data limit exceeded: {actual_bytes} bytes > {limit_bytes} bytes"))
            }
        }
    }
}
