//! NovaDE input plugin manager
//!
//! Discovers plugin manifests, opens plugin modules and turns the
//! configured plugin list into per-output plugin instances for
//! `novade-input-core`.

pub mod error;
pub mod loader;
pub mod manifest;

use std::fs;
use std::path::{Path, PathBuf};
use log::{error, info, warn};

pub use error::PluginManagerError;
pub use loader::{
    instantiate_all, load_plugin_from_file, load_plugins, module_file_name, module_path,
    register_profiles, AvailablePlugin, LoadedModule, PluginSource,
};
pub use manifest::PluginManifest;

/// A plugin found on disk, with the manifest it was described by.
#[derive(Debug, Clone)]
pub struct DiscoveredPlugin {
    pub manifest: PluginManifest,
    pub manifest_path: PathBuf,
    /// Module path; the manifest's `library`, or `lib<name>.so` next to it.
    pub library_path: PathBuf,
}

/// Scans the subdirectories of `directory` for `Plugin.toml` manifests.
///
/// Unreadable entries and invalid manifests are logged and skipped. Only a
/// missing or unreadable `directory` is an error.
pub fn discover_plugins_in_directory(directory: &Path) -> Result<Vec<DiscoveredPlugin>, PluginManagerError> {
    if !directory.is_dir() {
        return Err(PluginManagerError::DiscoveryError(format!(
            "Plugin directory not found or is not a directory: {}",
            directory.display()
        )));
    }

    let entries = fs::read_dir(directory).map_err(|e| {
        PluginManagerError::DiscoveryError(format!("Failed to read plugin directory {}: {}", directory.display(), e))
    })?;

    let mut discovered_plugins = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to access entry in plugin directory {}: {}", directory.display(), e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let manifest_path = path.join("Plugin.toml");
        if !manifest_path.is_file() {
            continue;
        }

        match PluginManifest::load_from_file(&manifest_path) {
            Ok(manifest) => {
                info!(
                    "Discovered plugin '{}' (version {}) at {}",
                    manifest.plugin.name,
                    manifest.plugin.version,
                    manifest_path.display()
                );
                let library = manifest
                    .plugin
                    .library
                    .clone()
                    .unwrap_or_else(|| module_file_name(&manifest.plugin.name));
                discovered_plugins.push(DiscoveredPlugin {
                    library_path: path.join(library),
                    manifest,
                    manifest_path,
                });
            }
            Err(e) => {
                error!("Failed to load or parse manifest at {}: {}", manifest_path.display(), e);
            }
        }
    }

    discovered_plugins.sort_by(|a, b| a.manifest.plugin.name.cmp(&b.manifest.plugin.name));
    Ok(discovered_plugins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_manifest(plugin_dir: &Path, body: &str) {
        fs::create_dir_all(plugin_dir).unwrap();
        let mut file = File::create(plugin_dir.join("Plugin.toml")).unwrap();
        writeln!(file, "{}", body).unwrap();
    }

    #[test]
    fn test_discover_plugins_empty_directory() {
        let dir = tempdir().unwrap();
        let plugins = discover_plugins_in_directory(dir.path()).unwrap();
        assert!(plugins.is_empty());
    }

    #[test]
    fn test_discover_plugins_missing_directory() {
        let dir = tempdir().unwrap();
        let result = discover_plugins_in_directory(&dir.path().join("absent"));
        assert!(matches!(result, Err(PluginManagerError::DiscoveryError(_))));
    }

    #[test]
    fn test_discover_plugins_sorted_with_library_paths() {
        let base = tempdir().unwrap();
        write_manifest(
            &base.path().join("zoom"),
            "[plugin]\nname = \"zoom\"\nversion = \"0.2.0\"\nabilities = [\"CUSTOM_RENDERING\"]",
        );
        write_manifest(
            &base.path().join("expo-dir"),
            "[plugin]\nname = \"expo\"\nversion = \"0.1.0\"\nlibrary = \"custom-expo.so\"\ncompatible_all = true",
        );

        let plugins = discover_plugins_in_directory(base.path()).unwrap();
        let names: Vec<&str> = plugins.iter().map(|p| p.manifest.plugin.name.as_str()).collect();
        assert_eq!(names, vec!["expo", "zoom"]);
        assert!(plugins[0].library_path.ends_with("expo-dir/custom-expo.so"));
        assert_eq!(plugins[0].manifest.plugin.compatible_all, Some(true));
        assert!(plugins[1].library_path.ends_with("zoom/libzoom.so"));
        assert!(plugins[1].manifest_path.ends_with("zoom/Plugin.toml"));
    }

    #[test]
    fn test_discover_plugins_invalid_manifest_is_skipped() {
        let base = tempdir().unwrap();
        write_manifest(&base.path().join("bad"), "this is not valid toml content");
        write_manifest(&base.path().join("good"), "[plugin]\nname = \"good\"\nversion = \"1.0.0\"");

        let plugins = discover_plugins_in_directory(base.path()).unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].manifest.plugin.name, "good");
    }

    #[test]
    fn test_discover_plugins_ignores_stray_files_and_empty_dirs() {
        let base = tempdir().unwrap();
        File::create(base.path().join("not_a_directory.txt")).unwrap();
        fs::create_dir(base.path().join("empty_plugin_dir")).unwrap();

        let plugins = discover_plugins_in_directory(base.path()).unwrap();
        assert!(plugins.is_empty());
    }
}
