//! Client error types.

use live_carousel_core::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration values are unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadConfig {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseConfig {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        #[source]
        source: toml::de::Error,
    },

    /// The carousel is no longer mounted.
    #[error("carousel unmounted")]
    Unmounted,

    /// The driver task panicked or was aborted.
    #[error("driver task failed: {0}")]
    DriverFailed(String),
}
