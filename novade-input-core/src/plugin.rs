//! The plugin contract.
//!
//! A plugin is instantiated once per output. It is initialized after its
//! output is registered and finalized before the output goes away. Plugins
//! interact with the core only through the `&mut Core` they are handed:
//! registering bindings, activating themselves, grabbing input.

use std::rc::Rc;
use tracing::debug;

use crate::context::Core;
use crate::input::grab::{GrabHandler, GrabInterface, GrabProfile};
use crate::types::OutputId;

pub trait Plugin {
    /// Name used in configuration and logs.
    fn name(&self) -> &str;

    /// Called once, right after the plugin is attached to `output`.
    fn init(&mut self, core: &mut Core, output: OutputId);

    /// Called once before the plugin is dropped. Plugins should deactivate
    /// themselves and remove their bindings here.
    fn fini(&mut self, _core: &mut Core) {}
}

impl Core {
    /// Registers the declared profile of plugin `name`, replacing any earlier
    /// one.
    pub fn set_plugin_profile(&mut self, name: impl Into<String>, profile: GrabProfile) {
        let name = name.into();
        debug!(plugin = %name, abilities = ?profile.abilities, "Plugin profile registered");
        self.plugin_profiles.insert(name, profile);
    }

    pub fn plugin_profile(&self, name: &str) -> Option<&GrabProfile> {
        self.plugin_profiles.get(name)
    }

    /// Creates a grab interface for plugin `name` on `output`, carrying the
    /// plugin's registered profile if there is one.
    pub fn grab_interface(
        &self,
        name: &str,
        output: OutputId,
        handler: Rc<dyn GrabHandler>,
    ) -> GrabInterface {
        let iface = GrabInterface::new(name, output, handler);
        match self.plugin_profile(name) {
            Some(profile) => iface.with_profile(profile),
            None => iface,
        }
    }
}

/// Constructor exported by dynamically loaded plugin modules.
pub type PluginFactory = fn() -> Box<dyn Plugin>;

/// Symbol under which a plugin module exports its [`PluginFactory`].
pub const PLUGIN_ENTRY_SYMBOL: &[u8] = b"novade_input_plugin_new\0";

/// Exports the plugin entry point from a plugin module.
///
/// ```rust,ignore
/// novade_input_core::declare_plugin!(MovePlugin::default());
/// ```
#[macro_export]
macro_rules! declare_plugin {
    ($constructor:expr) => {
        #[no_mangle]
        pub fn novade_input_plugin_new() -> ::std::boxed::Box<dyn $crate::plugin::Plugin> {
            ::std::boxed::Box::new($constructor)
        }
    };
}
