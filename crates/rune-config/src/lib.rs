//! Rune navigation configuration system
//!
//! This crate provides centralized configuration for the stack navigator,
//! loading settings from `rune.toml` with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but is not valid TOML for [`RuneConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuneConfig {
    /// Stack navigator behavior
    pub navigation: NavigationConfig,
    /// Swipe-back gesture tuning
    pub gestures: GestureConfig,
}

/// Stack navigator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Allow swipe-back gestures at all
    pub enable_gestures: bool,
    /// Allow a swipe-back gesture when only one scene is on the stack
    pub enable_gesture_on_first_scene: bool,
    /// Hide scenes that are outside the three animated slots
    pub hide_non_active_scenes: bool,
    /// How long touches are swallowed after a transition begins (milliseconds)
    pub intercept_touch_timeout_ms: f64,
    /// Scene config preset used when a scene does not pick one
    pub default_scene_config: String,
    /// Viewport width used before the first layout measurement
    pub initial_width: Option<f64>,
    /// Viewport height used before the first layout measurement
    pub initial_height: Option<f64>,
}

/// Gesture responder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Upper bound for the settle animation after release (milliseconds)
    pub max_duration_ms: f64,
    /// Fraction of the axis length past which a slow release goes back
    pub position_threshold: f64,
    /// Movement in pixels before a drag is claimed
    pub respond_threshold: f64,
    /// Release velocity (px/ms) that decides direction regardless of position
    pub velocity_threshold: f64,
    /// Distance from the leading edge where horizontal drags may start
    pub response_distance_horizontal: f64,
    /// Distance from the leading edge where vertical drags may start
    pub response_distance_vertical: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            enable_gestures: true,
            enable_gesture_on_first_scene: false,
            hide_non_active_scenes: true,
            intercept_touch_timeout_ms: 450.0,
            default_scene_config: "slide_from_right".to_string(),
            initial_width: None,
            initial_height: None,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            max_duration_ms: 500.0,
            position_threshold: 0.5,
            // Android PAGING_TOUCH_SLOP
            respond_threshold: 16.0,
            velocity_threshold: 0.5,
            response_distance_horizontal: 40.0,
            response_distance_vertical: 135.0,
        }
    }
}

impl RuneConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from the default location (rune.toml in the current directory)
    /// or return default configuration if file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("rune.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Some(val) = env_bool("RUNE_NAV_GESTURES") {
            self.navigation.enable_gestures = val;
        }
        if let Some(val) = env_bool("RUNE_NAV_GESTURE_ON_FIRST_SCENE") {
            self.navigation.enable_gesture_on_first_scene = val;
        }
        if let Some(val) = env_bool("RUNE_NAV_HIDE_INACTIVE") {
            self.navigation.hide_non_active_scenes = val;
        }
        if let Some(val) = env_f64("RUNE_NAV_INTERCEPT_TIMEOUT_MS") {
            self.navigation.intercept_touch_timeout_ms = val;
        }
        if let Ok(name) = std::env::var("RUNE_NAV_SCENE_CONFIG") {
            self.navigation.default_scene_config = name;
        }
        if let Some(val) = env_f64("RUNE_NAV_WIDTH") {
            self.navigation.initial_width = Some(val);
        }
        if let Some(val) = env_f64("RUNE_NAV_HEIGHT") {
            self.navigation.initial_height = Some(val);
        }

        if let Some(val) = env_f64("RUNE_NAV_GESTURE_MAX_DURATION_MS") {
            self.gestures.max_duration_ms = val;
        }
        if let Some(val) = env_f64("RUNE_NAV_GESTURE_POSITION_THRESHOLD") {
            self.gestures.position_threshold = val;
        }
        if let Some(val) = env_f64("RUNE_NAV_GESTURE_VELOCITY_THRESHOLD") {
            self.gestures.velocity_threshold = val;
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|val| val == "1" || val.eq_ignore_ascii_case("true"))
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name).ok().and_then(|val| val.parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RuneConfig::default();
        assert!(config.navigation.enable_gestures);
        assert!(!config.navigation.enable_gesture_on_first_scene);
        assert_eq!(config.navigation.intercept_touch_timeout_ms, 450.0);
        assert_eq!(config.gestures.position_threshold, 0.5);
        assert_eq!(config.gestures.response_distance_vertical, 135.0);
    }

    #[test]
    fn test_toml_serialization() {
        let config = RuneConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: RuneConfig = toml::from_str(&toml_str).unwrap();
        assert!(parsed.navigation.hide_non_active_scenes);
        assert_eq!(parsed.navigation.default_scene_config, "slide_from_right");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = RuneConfig::from_toml_str(
            r#"
            [navigation]
            default_scene_config = "fade"
            initial_width = 390.0

            [gestures]
            max_duration_ms = 300.0
            "#,
        )
        .unwrap();

        assert_eq!(config.navigation.default_scene_config, "fade");
        assert_eq!(config.navigation.initial_width, Some(390.0));
        assert!(config.navigation.enable_gestures);
        assert_eq!(config.gestures.max_duration_ms, 300.0);
        assert_eq!(config.gestures.respond_threshold, 16.0);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = RuneConfig::load_from_file("definitely/not/here/rune.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("RUNE_NAV_SCENE_CONFIG", "fade_popup");
            std::env::set_var("RUNE_NAV_GESTURES", "false");
        }

        let mut config = RuneConfig::default();
        config.merge_with_env();

        assert_eq!(config.navigation.default_scene_config, "fade_popup");
        assert!(!config.navigation.enable_gestures);

        unsafe {
            std::env::remove_var("RUNE_NAV_SCENE_CONFIG");
            std::env::remove_var("RUNE_NAV_GESTURES");
        }
    }
}
