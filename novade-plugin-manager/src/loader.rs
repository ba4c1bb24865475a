//! Loading of plugin modules and resolution of the configured plugin list.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use libloading::{Library, Symbol};
use log::{debug, info, warn};
use novade_input_core::config::PluginsConfig;
use novade_input_core::{Core, GrabProfile, OutputId, Plugin, PluginFactory, PLUGIN_ENTRY_SYMBOL};

use crate::error::PluginManagerError;
use crate::{discover_plugins_in_directory, DiscoveredPlugin};

/// An opened plugin module and its entry point.
pub struct LoadedModule {
    path: PathBuf,
    factory: PluginFactory,
    library: Rc<Library>,
}

impl LoadedModule {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates a new plugin instance. The instance keeps the module mapped.
    pub fn instantiate(&self) -> Box<dyn Plugin> {
        Box::new(ModulePlugin {
            inner: (self.factory)(),
            _library: Rc::clone(&self.library),
        })
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule").field("path", &self.path).finish_non_exhaustive()
    }
}

/// A plugin instance created by a module.
///
/// Fields drop in declaration order, so the instance is gone before the
/// library handle is released.
struct ModulePlugin {
    inner: Box<dyn Plugin>,
    _library: Rc<Library>,
}

impl Plugin for ModulePlugin {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn init(&mut self, core: &mut Core, output: OutputId) {
        self.inner.init(core, output);
    }

    fn fini(&mut self, core: &mut Core) {
        self.inner.fini(core);
    }
}

/// Where the instances of a configured plugin come from.
#[derive(Debug)]
pub enum PluginSource {
    Builtin(PluginFactory),
    Module(LoadedModule),
}

/// A configured plugin that is ready to be instantiated per output.
#[derive(Debug)]
pub struct AvailablePlugin {
    pub name: String,
    pub source: PluginSource,
    /// Declared by the plugin's manifest, if it has one.
    pub profile: Option<GrabProfile>,
}

impl AvailablePlugin {
    pub fn instantiate(&self) -> Box<dyn Plugin> {
        match &self.source {
            PluginSource::Builtin(factory) => factory(),
            PluginSource::Module(module) => module.instantiate(),
        }
    }
}

/// Opens the module at `path` and resolves its entry point.
pub fn load_plugin_from_file(path: &Path) -> Result<LoadedModule, PluginManagerError> {
    let symbol_name = String::from_utf8_lossy(&PLUGIN_ENTRY_SYMBOL[..PLUGIN_ENTRY_SYMBOL.len() - 1]).into_owned();

    // SAFETY: plugin modules are trusted code built against this crate. The
    // entry point is declared with `declare_plugin!`, which gives it the
    // `PluginFactory` signature. The factory pointer is only called through
    // `LoadedModule`, which holds the library open.
    let (library, factory) = unsafe {
        let library = Library::new(path).map_err(|e| PluginManagerError::LoadingError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let factory = {
            let symbol: Symbol<'_, PluginFactory> =
                library.get(PLUGIN_ENTRY_SYMBOL).map_err(|e| PluginManagerError::SymbolNotFound {
                    library_path: path.to_path_buf(),
                    symbol_name,
                    source: e,
                })?;
            *symbol
        };
        (library, factory)
    };

    debug!("Opened plugin module {}", path.display());
    Ok(LoadedModule {
        path: path.to_path_buf(),
        factory,
        library: Rc::new(library),
    })
}

/// File name of the module for plugin `name`.
pub fn module_file_name(name: &str) -> String {
    format!("lib{}.so", name)
}

/// Manifests found under `directory`, by plugin name. A missing directory
/// yields none.
fn discover_manifests(directory: &Path) -> HashMap<String, DiscoveredPlugin> {
    match discover_plugins_in_directory(directory) {
        Ok(found) => found
            .into_iter()
            .map(|d| (d.manifest.plugin.name.clone(), d))
            .collect(),
        Err(e) => {
            debug!("No plugin manifests used: {}", e);
            HashMap::new()
        }
    }
}

/// Module path of plugin `name`: the library its manifest points at, or
/// `<directory>/lib<name>.so`.
pub fn module_path(directory: &Path, name: &str, discovered: Option<&DiscoveredPlugin>) -> PathBuf {
    match discovered {
        Some(plugin) => plugin.library_path.clone(),
        None => directory.join(module_file_name(name)),
    }
}

/// Resolves every name in `config.enabled`, in order.
///
/// Manifests under `config.path` supply each plugin's profile and module
/// location. A built-in factory registered under the name wins over a
/// module. Plugins that cannot be loaded, or whose manifest is invalid, are
/// logged and left out.
pub fn load_plugins(config: &PluginsConfig, builtins: &HashMap<String, PluginFactory>) -> Vec<AvailablePlugin> {
    let manifests = discover_manifests(&config.path);
    let mut available = Vec::with_capacity(config.enabled.len());

    for name in &config.enabled {
        if available.iter().any(|p: &AvailablePlugin| &p.name == name) {
            warn!("Plugin '{}' is enabled more than once, ignoring duplicate", name);
            continue;
        }

        let discovered = manifests.get(name);
        let profile = match discovered.map(|d| d.manifest.profile()).transpose() {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Skipping plugin '{}': {}", name, e);
                continue;
            }
        };

        if let Some(factory) = builtins.get(name) {
            debug!("Using built-in plugin '{}'", name);
            available.push(AvailablePlugin {
                name: name.clone(),
                source: PluginSource::Builtin(*factory),
                profile,
            });
            continue;
        }

        let path = module_path(&config.path, name, discovered);
        match load_plugin_from_file(&path) {
            Ok(module) => {
                info!("Loaded plugin '{}' from {}", name, path.display());
                available.push(AvailablePlugin {
                    name: name.clone(),
                    source: PluginSource::Module(module),
                    profile,
                });
            }
            Err(e) => {
                warn!("Skipping plugin '{}': {}", name, e);
            }
        }
    }

    available
}

/// Registers the manifest profiles of `plugins` with the core, so grab
/// interfaces made through [`Core::grab_interface`] carry them.
pub fn register_profiles(core: &mut Core, plugins: &[AvailablePlugin]) {
    for plugin in plugins {
        if let Some(profile) = &plugin.profile {
            core.set_plugin_profile(plugin.name.clone(), profile.clone());
        }
    }
}

/// One fresh instance of every available plugin, for a new output.
pub fn instantiate_all(plugins: &[AvailablePlugin]) -> Vec<Box<dyn Plugin>> {
    plugins.iter().map(AvailablePlugin::instantiate).collect()
}
