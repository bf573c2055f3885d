//! Builds and installs the global [`tracing`] subscriber.

use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, Format};
use crate::error::{LogError, LogResult};

/// Builds a subscriber from a [`Config`].
#[derive(Debug)]
pub struct LoggerBuilder {
    config: Config,
}

/// Keeps the installed subscriber alive. Currently a marker type — kept so
/// future file/async writers can hand back a guard without a signature
/// change at call sites.
#[derive(Debug)]
pub struct LoggerGuard {
    _private: (),
}

impl LoggerBuilder {
    /// Start building from a config.
    #[must_use]
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Install the subscriber as the global default.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Filter`] if `config.level` is not a valid
    /// env-filter directive string, or [`LogError::AlreadyInitialized`] if
    /// a global subscriber is already set.
    pub fn build(self) -> LogResult<LoggerGuard> {
        let filter = EnvFilter::try_new(&self.config.level)
            .map_err(|e| LogError::Filter(format!("{}: {e}", self.config.level)))?;

        let registry = Registry::default().with(filter);
        let result = match self.config.format {
            Format::Pretty => registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init(),
            Format::Compact => registry
                .with(tracing_subscriber::fmt::layer().compact())
                .try_init(),
            Format::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        };
        result.map_err(|_| LogError::AlreadyInitialized)?;

        Ok(LoggerGuard { _private: () })
    }
}

/// Install a subscriber built from `config` as the global default.
///
/// # Errors
///
/// See [`LoggerBuilder::build`].
pub fn init(config: Config) -> LogResult<LoggerGuard> {
    LoggerBuilder::from_config(config).build()
}
