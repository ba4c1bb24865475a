//! Error types for the NovaDE input plugin manager.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginManagerError {
    #[error("Plugin discovery failed: {0}")]
    DiscoveryError(String),

    #[error("Manifest parsing error in '{path}': {source}")]
    ManifestParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("I/O error related to manifest file '{path}': {source}")]
    ManifestIoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest for plugin '{plugin}': {reason}")]
    InvalidManifest { plugin: String, reason: String },

    #[error("Failed to open plugin module '{path}': {source}")]
    LoadingError {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("Plugin entry point symbol '{symbol_name}' not found in library '{library_path}': {source}")]
    SymbolNotFound {
        library_path: PathBuf,
        symbol_name: String,
        #[source]
        source: libloading::Error,
    },

    #[error("Plugin not found: {0}")]
    PluginNotFound(String),
}
