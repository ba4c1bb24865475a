//! Outputs: their plugins, their signals, and which one has input focus.
//!
//! Bindings and plugin activation are scoped per output. Exactly one output
//! (if any exists) is focused; only its bindings fire and only its plugins
//! may hold the input grab.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Weak;
use tracing::{debug, info, warn};

use crate::callback::Callback;
use crate::context::Core;
use crate::error::InputCoreError;
use crate::input::grab::GrabInterface;
use crate::plugin::Plugin;
use crate::types::{Geometry, OutputId};

/// Notifications emitted on an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSignal {
    /// The first plugin is about to become active and asked fullscreen
    /// views to get out of the way.
    ActivationRequest { lower_fullscreen: bool },
    /// The last active plugin was deactivated.
    ActivationResumed,
    /// The output became the focused output.
    GainFocus,
}

pub type SignalCallback = Callback<OutputSignal>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(u64);

pub struct Output {
    id: OutputId,
    geometry: Geometry,
    pub(crate) active_plugins: Vec<Weak<GrabInterface>>,
    pub(crate) plugins: Vec<Box<dyn Plugin>>,
    signals: BTreeMap<SignalId, SignalCallback>,
    next_signal: u64,
}

impl Output {
    fn new(id: OutputId, geometry: Geometry) -> Self {
        Self {
            id,
            geometry,
            active_plugins: Vec::new(),
            plugins: Vec::new(),
            signals: BTreeMap::new(),
            next_signal: 0,
        }
    }

    pub fn id(&self) -> OutputId {
        self.id
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Names of the plugins attached to this output, in load order.
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("id", &self.id)
            .field("geometry", &self.geometry)
            .field("plugins", &self.plugin_names())
            .field("active_plugins", &self.active_plugins.len())
            .field("signals", &self.signals.len())
            .finish()
    }
}

impl Core {
    /// Registers an output and attaches `plugins` to it.
    ///
    /// Each plugin is initialized in order. The first output registered
    /// becomes the focused output. Bound shell clients are told about it.
    pub fn add_output(
        &mut self,
        id: OutputId,
        geometry: Geometry,
        plugins: Vec<Box<dyn Plugin>>,
    ) -> Result<(), InputCoreError> {
        if self.outputs.contains_key(&id) {
            return Err(InputCoreError::OutputExists(id));
        }
        self.outputs.insert(id, Output::new(id, geometry));
        info!(output = %id, ?geometry, plugins = plugins.len(), "Output added");

        for mut plugin in plugins {
            plugin.init(self, id);
            debug!(output = %id, plugin = plugin.name(), "Plugin initialized");
            match self.outputs.get_mut(&id) {
                Some(output) => output.plugins.push(plugin),
                None => {
                    warn!(output = %id, "Output removed while its plugins were initializing");
                    plugin.fini(self);
                }
            }
        }

        self.announce_output_created(id, geometry);
        if self.focused_output.is_none() {
            self.focus_output(id)?;
        }
        Ok(())
    }

    /// Tears an output down: finalizes its plugins, drops its bindings and
    /// active plugins, and moves focus elsewhere if it was focused.
    pub fn remove_output(&mut self, id: OutputId) -> Result<(), InputCoreError> {
        let output = self.outputs.get_mut(&id).ok_or(InputCoreError::UnknownOutput(id))?;
        let mut plugins = std::mem::take(&mut output.plugins);
        for plugin in plugins.iter_mut() {
            plugin.fini(self);
        }
        drop(plugins);

        if self.active_grab().is_some_and(|grab| grab.output() == id) {
            self.ungrab_input();
        }
        let freed = self.bindings.remove_output(id);
        self.outputs.remove(&id);
        info!(output = %id, freed_bindings = freed, "Output removed");
        self.announce_output_destroyed(id);

        if self.focused_output == Some(id) {
            self.focused_output = None;
            if let Some(&next) = self.outputs.keys().next() {
                self.focus_output(next)?;
            }
        }
        Ok(())
    }

    /// Moves input focus to `id`.
    ///
    /// The grab follows focus: a grab held on the previous output is
    /// released, and a plugin active on the new output that wants a grab
    /// gets it.
    pub fn focus_output(&mut self, id: OutputId) -> Result<(), InputCoreError> {
        if !self.outputs.contains_key(&id) {
            return Err(InputCoreError::UnknownOutput(id));
        }
        if self.focused_output == Some(id) {
            return Ok(());
        }
        self.focused_output = Some(id);
        debug!(output = %id, "Output focused");

        if self.active_grab().is_some() {
            self.ungrab_input();
        }
        if let Some(iface) = self.input_grab_interface(id) {
            if let Err(e) = self.grab_input(&iface) {
                warn!(plugin = iface.name(), "Grab did not follow focus: {}", e);
            }
        }
        self.emit_output_signal(id, OutputSignal::GainFocus);
        Ok(())
    }

    pub fn focused_output(&self) -> Option<OutputId> {
        self.focused_output
    }

    pub(crate) fn focused_output_geometry(&self) -> Option<Geometry> {
        self.focused_output
            .and_then(|id| self.outputs.get(&id))
            .map(Output::geometry)
    }

    pub fn output(&self, id: OutputId) -> Option<&Output> {
        self.outputs.get(&id)
    }

    pub fn output_ids(&self) -> Vec<OutputId> {
        self.outputs.keys().copied().collect()
    }

    pub fn connect_signal(
        &mut self,
        output: OutputId,
        callback: SignalCallback,
    ) -> Result<SignalId, InputCoreError> {
        let output = self
            .outputs
            .get_mut(&output)
            .ok_or(InputCoreError::UnknownOutput(output))?;
        let id = SignalId(output.next_signal);
        output.next_signal += 1;
        output.signals.insert(id, callback);
        Ok(id)
    }

    pub fn disconnect_signal(&mut self, output: OutputId, id: SignalId) -> bool {
        self.outputs
            .get_mut(&output)
            .is_some_and(|o| o.signals.remove(&id).is_some())
    }

    pub(crate) fn emit_output_signal(&mut self, output: OutputId, signal: OutputSignal) {
        let callbacks: Vec<SignalCallback> = match self.outputs.get(&output) {
            Some(o) => o.signals.values().cloned().collect(),
            None => return,
        };
        debug!(output = %output, ?signal, handlers = callbacks.len(), "Emitting output signal");
        for callback in &callbacks {
            callback.call(self, &signal);
        }
    }
}
