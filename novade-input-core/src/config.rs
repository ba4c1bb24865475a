//! Configuration for the input core.
//!
//! The configuration is a TOML document with four tables, all optional:
//!
//! ```toml
//! [gestures]
//! min_fingers = 3
//! swipe_distance = 100.0
//! pinch_distance = 70.0
//! edge_threshold = 50.0
//!
//! [plugins]
//! path = "/usr/lib/novade/input-plugins"
//! enabled = ["move", "resize", "expo"]
//! compatibility = "abilities"   # or "named"
//!
//! [session]
//! autostart = ["novade-panel"]
//! wayland_display = "wayland-0"
//!
//! [logging]
//! level = "info"
//! format = "text"               # or "json"
//! ```
//!
//! Unknown fields are rejected (`#[serde(deny_unknown_fields)]`) so typos in
//! a configuration file surface as parse errors instead of silently falling
//! back to defaults.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn default_min_fingers() -> usize {
    3
}

fn default_swipe_distance() -> f64 {
    100.0
}

fn default_pinch_distance() -> f64 {
    70.0
}

fn default_edge_threshold() -> f64 {
    50.0
}

fn default_plugin_path() -> PathBuf {
    PathBuf::from("/usr/lib/novade/input-plugins")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Root configuration of the input core.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputCoreConfig {
    #[serde(default)]
    pub gestures: GestureConfig,
    #[serde(default)]
    pub plugins: PluginsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Thresholds of the multi-finger gesture recognizer. Distances are in
/// global compositor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GestureConfig {
    /// Fingers needed before touches are taken away from clients.
    #[serde(default = "default_min_fingers")]
    pub min_fingers: usize,
    /// Minimum travel of every finger for a swipe.
    #[serde(default = "default_swipe_distance")]
    pub swipe_distance: f64,
    /// Minimum change of the summed finger-to-centroid distance for a pinch.
    #[serde(default = "default_pinch_distance")]
    pub pinch_distance: f64,
    /// How close to an output edge fingers must start for an edge swipe.
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_fingers: default_min_fingers(),
            swipe_distance: default_swipe_distance(),
            pinch_distance: default_pinch_distance(),
            edge_threshold: default_edge_threshold(),
        }
    }
}

/// How plugin compatibility is decided when activating a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityScheme {
    /// Two plugins conflict when their ability masks intersect.
    #[default]
    Abilities,
    /// Each plugin names the plugins it tolerates, or tolerates everyone.
    Named,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Directory searched for `lib<name>.so` plugin modules.
    #[serde(default = "default_plugin_path")]
    pub path: PathBuf,
    /// Plugins instantiated for every output, in order.
    #[serde(default)]
    pub enabled: Vec<String>,
    #[serde(default)]
    pub compatibility: CompatibilityScheme,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            path: default_plugin_path(),
            enabled: Vec::new(),
            compatibility: CompatibilityScheme::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Shell commands started once, the first time the core is woken.
    #[serde(default)]
    pub autostart: Vec<String>,
    /// Value exported as `WAYLAND_DISPLAY` to spawned commands.
    #[serde(default)]
    pub wayland_display: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging settings, consumed by [`crate::logging::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// One of `trace`, `debug`, `info`, `warn`, `error`.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl InputCoreConfig {
    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// * `ConfigError::ReadError` if the file cannot be read.
    /// * `ConfigError::ParseError` if it is not valid TOML for this schema.
    /// * `ConfigError::ValidationError` if a value is out of range.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates a configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that the schema alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.gestures;
        if g.min_fingers < 2 {
            return Err(ConfigError::ValidationError(format!(
                "gestures.min_fingers must be at least 2, got {}",
                g.min_fingers
            )));
        }
        for (name, value) in [
            ("swipe_distance", g.swipe_distance),
            ("pinch_distance", g.pinch_distance),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "gestures.{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if !g.edge_threshold.is_finite() || g.edge_threshold < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "gestures.edge_threshold must not be negative, got {}",
                g.edge_threshold
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level '{}' is not one of {:?}",
                self.logging.level, LOG_LEVELS
            )));
        }
        if let Some(name) = self.plugins.enabled.iter().find(|n| n.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "plugins.enabled contains an empty plugin name: {:?}",
                name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = InputCoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, InputCoreConfig::default());
        assert_eq!(config.gestures.min_fingers, 3);
        assert_eq!(config.gestures.swipe_distance, 100.0);
        assert_eq!(config.gestures.pinch_distance, 70.0);
        assert_eq!(config.gestures.edge_threshold, 50.0);
        assert_eq!(config.plugins.compatibility, CompatibilityScheme::Abilities);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_full_document() {
        let toml_str = r#"
            [gestures]
            min_fingers = 4
            swipe_distance = 150.0

            [plugins]
            path = "/opt/novade/plugins"
            enabled = ["move", "expo"]
            compatibility = "named"

            [session]
            autostart = ["novade-panel", "novade-background"]
            wayland_display = "wayland-1"

            [logging]
            level = "debug"
            format = "json"
        "#;
        let config = InputCoreConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.gestures.min_fingers, 4);
        assert_eq!(config.gestures.swipe_distance, 150.0);
        assert_eq!(config.gestures.pinch_distance, 70.0, "Unset fields keep defaults.");
        assert_eq!(config.plugins.path, PathBuf::from("/opt/novade/plugins"));
        assert_eq!(config.plugins.enabled, vec!["move".to_string(), "expo".to_string()]);
        assert_eq!(config.plugins.compatibility, CompatibilityScheme::Named);
        assert_eq!(config.session.autostart.len(), 2);
        assert_eq!(config.session.wayland_display.as_deref(), Some("wayland-1"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = InputCoreConfig::from_toml_str("[gestures]\nmin_finger = 3\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[rstest]
    #[case("[gestures]\nmin_fingers = 1\n", "min_fingers")]
    #[case("[gestures]\nswipe_distance = 0.0\n", "swipe_distance")]
    #[case("[gestures]\npinch_distance = -5.0\n", "pinch_distance")]
    #[case("[gestures]\nedge_threshold = -1.0\n", "edge_threshold")]
    #[case("[logging]\nlevel = \"verbose\"\n", "logging.level")]
    #[case("[plugins]\nenabled = [\"move\", \" \"]\n", "empty plugin name")]
    fn test_validation_failures(#[case] toml_str: &str, #[case] needle: &str) {
        match InputCoreConfig::from_toml_str(toml_str) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains(needle), "Message '{}' should mention '{}'", msg, needle)
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[session]\nautostart = [\"foot\"]").unwrap();
        let config = InputCoreConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.session.autostart, vec!["foot".to_string()]);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        match InputCoreConfig::load_from_file(&path) {
            Err(ConfigError::ReadError { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected ReadError, got {:?}", other),
        }
    }
}
