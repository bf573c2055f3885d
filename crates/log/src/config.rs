//! Logger configuration.

use serde::{Deserialize, Serialize};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    /// Human-readable, multi-line, for local development.
    Pretty,
    /// Single-line human-readable, for terminals and container logs.
    Compact,
    /// Newline-delimited JSON, for log aggregators.
    Json,
}

impl Default for Format {
    fn default() -> Self {
        Self::Compact
    }
}

/// Logger configuration.
///
/// `level` is an [`tracing_subscriber::EnvFilter`] directive string (e.g.
/// `"info"`, `"nebula_engine=debug,info"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Env-filter directive string.
    pub level: String,
    /// Output format.
    pub format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::default(),
        }
    }
}

impl Config {
    /// A config suited for local development: pretty output, debug level.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: Format::Pretty,
        }
    }

    /// A config suited for production: JSON output, info level.
    #[must_use]
    pub fn production() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::Json,
        }
    }
}
