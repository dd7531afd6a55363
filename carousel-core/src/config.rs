//! Carousel configuration.
//!
//! Every field has a default, so an empty table is a valid configuration.
//! Field names are snake_case; the camelCase spellings used by web
//! front-ends (`autoplayIntervalMs`, ...) are accepted as aliases.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for one carousel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarouselConfig {
    /// Autoplay period in milliseconds (default: 5000).
    #[serde(default = "default_autoplay_interval_ms", alias = "autoplayIntervalMs")]
    pub autoplay_interval_ms: u64,
    /// Locked duration of one slide transition in milliseconds (default: 600).
    #[serde(default = "default_transition_duration_ms", alias = "transitionDurationMs")]
    pub transition_duration_ms: u64,
    /// Horizontal drag distance that counts as a swipe (default: 48).
    #[serde(default = "default_drag_threshold_px", alias = "dragThresholdPx")]
    pub drag_threshold_px: f32,
    /// Vertical drift beyond which a drag is not a swipe (default: 80).
    #[serde(default = "default_perpendicular_tolerance_px", alias = "perpendicularTolerancePx")]
    pub perpendicular_tolerance_px: f32,
    /// Bound on the drag-follow offset reported to the view (default: 160).
    #[serde(default = "default_max_drag_feedback_px", alias = "maxDragFeedbackPx")]
    pub max_drag_feedback_px: f32,
    /// Wrap from the last item to the first and back (default: false).
    #[serde(default, alias = "wrapAround")]
    pub wrap_around: bool,
}

fn default_autoplay_interval_ms() -> u64 {
    5000
}

fn default_transition_duration_ms() -> u64 {
    600
}

fn default_drag_threshold_px() -> f32 {
    48.0
}

fn default_perpendicular_tolerance_px() -> f32 {
    80.0
}

fn default_max_drag_feedback_px() -> f32 {
    160.0
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            autoplay_interval_ms: default_autoplay_interval_ms(),
            transition_duration_ms: default_transition_duration_ms(),
            drag_threshold_px: default_drag_threshold_px(),
            perpendicular_tolerance_px: default_perpendicular_tolerance_px(),
            max_drag_feedback_px: default_max_drag_feedback_px(),
            wrap_around: false,
        }
    }
}

impl CarouselConfig {
    /// Autoplay period.
    pub fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.autoplay_interval_ms)
    }

    /// Transition lock duration.
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }

    /// Set the autoplay period.
    pub fn with_autoplay_interval(mut self, interval: Duration) -> Self {
        self.autoplay_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set the transition lock duration.
    pub fn with_transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Enable or disable wrap-around navigation.
    pub fn with_wrap_around(mut self, wrap: bool) -> Self {
        self.wrap_around = wrap;
        self
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.autoplay_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "autoplay_interval_ms",
            });
        }
        if self.transition_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "transition_duration_ms",
            });
        }
        let distances = [
            ("drag_threshold_px", self.drag_threshold_px),
            ("perpendicular_tolerance_px", self.perpendicular_tolerance_px),
            ("max_drag_feedback_px", self.max_drag_feedback_px),
        ];
        for (field, value) in distances {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositiveDistance { field, value });
            }
        }
        Ok(())
    }
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A duration that must be non-zero is zero.
    #[error("{field} must be greater than zero")]
    ZeroDuration {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A distance that must be positive is not.
    #[error("{field} must be a positive number (got {value})")]
    NonPositiveDistance {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CarouselConfig::default();
        assert_eq!(config.autoplay_interval(), Duration::from_secs(5));
        assert_eq!(config.transition_duration(), Duration::from_millis(600));
        assert_eq!(config.drag_threshold_px, 48.0);
        assert_eq!(config.perpendicular_tolerance_px, 80.0);
        assert!(!config.wrap_around);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
autoplay_interval_ms = 3000
transition_duration_ms = 400
drag_threshold_px = 30.5
wrap_around = true
"#;
        let config: CarouselConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.autoplay_interval_ms, 3000);
        assert_eq!(config.transition_duration_ms, 400);
        assert_eq!(config.drag_threshold_px, 30.5);
        assert_eq!(config.perpendicular_tolerance_px, 80.0);
        assert!(config.wrap_around);
    }

    #[test]
    fn config_accepts_camel_case_aliases() {
        let json = r#"{"autoplayIntervalMs": 7000, "perpendicularTolerancePx": 20}"#;
        let config: CarouselConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.autoplay_interval_ms, 7000);
        assert_eq!(config.perpendicular_tolerance_px, 20.0);
        assert_eq!(config.transition_duration_ms, 600);
    }

    #[test]
    fn config_missing_fields_use_defaults() {
        let config: CarouselConfig = toml::from_str("").unwrap();
        assert_eq!(config, CarouselConfig::default());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = CarouselConfig {
            autoplay_interval_ms: 0,
            ..CarouselConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration {
                field: "autoplay_interval_ms"
            })
        );
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let config = CarouselConfig {
            drag_threshold_px: -1.0,
            ..CarouselConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveDistance {
                field: "drag_threshold_px",
                ..
            })
        ));
    }

    #[test]
    fn nan_tolerance_is_rejected() {
        let config = CarouselConfig {
            perpendicular_tolerance_px: f32::NAN,
            ..CarouselConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_pattern() {
        let config = CarouselConfig::default()
            .with_autoplay_interval(Duration::from_secs(2))
            .with_transition_duration(Duration::from_millis(250))
            .with_wrap_around(true);
        assert_eq!(config.autoplay_interval_ms, 2000);
        assert_eq!(config.transition_duration_ms, 250);
        assert!(config.wrap_around);
    }
}
