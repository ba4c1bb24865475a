//! Defines the structure for the `Plugin.toml` manifest file and provides
//! functionality to load and parse it.

use novade_input_core::{Abilities, GrabProfile};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::error::PluginManagerError;

/// Represents the overall structure of the `Plugin.toml` file.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PluginManifest {
    pub plugin: PluginDetails,
}

/// Contents of the `[plugin]` table.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PluginDetails {
    /// Name used in `plugins.enabled` and in activation conflicts.
    pub name: String,
    pub version: String,
    /// Module file name, relative to the manifest's directory.
    #[serde(default)]
    pub library: Option<String>,
    /// Ability names, e.g. `"GRAB_INPUT"`.
    #[serde(default)]
    pub abilities: Vec<String>,
    /// Plugins this one may be active alongside under the named scheme.
    #[serde(default)]
    pub compatible: Vec<String>,
    /// Defaults to `true` when `compatible` is empty.
    #[serde(default)]
    pub compatible_all: Option<bool>,
}

impl PluginManifest {
    /// Loads and parses a `Plugin.toml` file from the given path.
    pub fn load_from_file(path: &Path) -> Result<Self, PluginManagerError> {
        let content = fs::read_to_string(path).map_err(|e| PluginManagerError::ManifestIoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::load_from_string(&content, path)
    }

    /// Parses a `Plugin.toml` string.
    pub fn load_from_string(content: &str, source_path_for_error: &Path) -> Result<Self, PluginManagerError> {
        toml::from_str(content).map_err(|e| PluginManagerError::ManifestParseError {
            path: source_path_for_error.to_path_buf(),
            source: e,
        })
    }

    /// Resolves the declared ability names into an [`Abilities`] mask.
    pub fn abilities(&self) -> Result<Abilities, PluginManagerError> {
        self.plugin.abilities.iter().try_fold(Abilities::empty(), |mask, name| {
            Abilities::from_name(name)
                .map(|ability| mask | ability)
                .ok_or_else(|| PluginManagerError::InvalidManifest {
                    plugin: self.plugin.name.clone(),
                    reason: format!("unknown ability '{}'", name),
                })
        })
    }

    /// The activation profile the plugin's grab interfaces are created with.
    pub fn profile(&self) -> Result<GrabProfile, PluginManagerError> {
        Ok(GrabProfile {
            abilities: self.abilities()?,
            compat: self.plugin.compatible.clone(),
            compat_all: self
                .plugin
                .compatible_all
                .unwrap_or(self.plugin.compatible.is_empty()),
        })
    }
}
