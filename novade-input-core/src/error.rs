//! Error types for the input core.
//!
//! Admission failures (a grab request that cannot be honored, an incompatible
//! plugin activation) are reported through [`GrabError`] and
//! [`ActivationError`]; no state is mutated on those paths. [`InputCoreError`]
//! is the crate-level error that wraps them together with configuration,
//! output bookkeeping and process spawning failures.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::OutputId;

/// Crate-level error type.
#[derive(Debug, Error)]
pub enum InputCoreError {
    /// Errors related to configuration loading, parsing, or validation.
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),

    /// The logging subsystem could not be installed.
    #[error("Logging Initialization Failed: {0}")]
    LoggingInitialization(String),

    #[error("Unknown output: {0}")]
    UnknownOutput(OutputId),

    #[error("Output {0} is already registered")]
    OutputExists(OutputId),

    #[error(transparent)]
    Grab(#[from] GrabError),

    #[error(transparent)]
    Activation(#[from] ActivationError),

    /// A detached command could not be started.
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Why an exclusive input grab was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrabError {
    /// The interface has not asked for an exclusive grab.
    #[error("Grab interface '{name}' does not request an input grab")]
    NotRequested { name: String },

    /// The compositor does not own the display hardware right now.
    #[error("Input session is not active")]
    SessionInactive,

    /// Another interface already holds the grab. At most one grab exists.
    #[error("Input is already grabbed by '{active}', refusing grab for '{requested}'")]
    AlreadyGrabbed { active: String, requested: String },

    /// Plugins may only grab input while they are active on their output.
    #[error("Plugin '{name}' is not active on its output")]
    PluginInactive { name: String },
}

/// Why a plugin could not be activated on an output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    #[error("Unknown output: {0}")]
    UnknownOutput(OutputId),

    /// An already active plugin shares an ability with the requested one.
    #[error("Plugin '{requested}' is incompatible with active plugin '{active}'")]
    Incompatible { requested: String, active: String },
}

/// Error type for configuration-related operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An error occurred while attempting to read a configuration file.
    #[error("Failed to read configuration file from {path:?}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Parsed successfully, but a value is out of range.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_grab_error_messages() {
        let err = GrabError::AlreadyGrabbed {
            active: "move".to_string(),
            requested: "resize".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Input is already grabbed by 'move', refusing grab for 'resize'"
        );
        assert_eq!(GrabError::SessionInactive.to_string(), "Input session is not active");
    }

    #[test]
    fn test_core_error_wraps_config_error_with_source() {
        let core_err = InputCoreError::from(ConfigError::ValidationError("min_fingers".into()));
        assert_eq!(
            core_err.to_string(),
            "Configuration Error: Configuration validation failed: min_fingers"
        );
        assert!(core_err.source().is_some());
    }

    #[test]
    fn test_grab_error_is_transparent() {
        let core_err = InputCoreError::from(GrabError::SessionInactive);
        assert_eq!(core_err.to_string(), GrabError::SessionInactive.to_string());
    }
}
