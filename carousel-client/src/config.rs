//! Configuration file loading.
//!
//! Carousel settings live under a `[carousel]` table so the file can be
//! shared with other application settings:
//!
//! ```toml
//! [carousel]
//! autoplay_interval_ms = 4000
//! transition_duration_ms = 450
//! wrap_around = true
//! ```

use live_carousel_core::CarouselConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ClientError;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Carousel tunables.
    #[serde(default)]
    pub carousel: CarouselConfig,
}

impl ClientConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ClientError> {
        let content = std::fs::read_to_string(path).map_err(|e| ClientError::ReadConfig {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ClientError::ParseConfig {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.carousel.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ClientError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Render back to TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}
