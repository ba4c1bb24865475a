//! Per-output plugin activation.
//!
//! A plugin is *active* on its output while it is doing something visible
//! (an animation, an interactive operation). Activation is admission
//! controlled: a plugin can only become active when it is compatible with
//! every plugin already active on that output. Compatibility is decided by
//! the configured [`CompatibilityScheme`](crate::CompatibilityScheme).

use std::rc::{Rc, Weak};
use tracing::{debug, info};

use crate::context::Core;
use crate::error::ActivationError;
use crate::input::grab::GrabInterface;
use crate::output::OutputSignal;
use crate::types::OutputId;

enum Admission {
    AlreadyActive,
    Admitted { was_empty: bool },
}

fn same_iface(weak: &Weak<GrabInterface>, iface: &Rc<GrabInterface>) -> bool {
    std::ptr::eq(weak.as_ptr(), Rc::as_ptr(iface))
}

impl Core {
    /// Activates `owner` on its output.
    ///
    /// Activating an already active plugin succeeds without side effects.
    /// When `owner` is the first active plugin and `lower_fullscreen` is set,
    /// [`OutputSignal::ActivationRequest`] is emitted before `owner` joins
    /// the active set. Admission is checked again after the signal, since its
    /// handlers may activate other plugins.
    ///
    /// # Errors
    ///
    /// * `ActivationError::UnknownOutput` if the owner's output is gone.
    /// * `ActivationError::Incompatible` naming the first conflicting active
    ///   plugin, also when the conflict was introduced by an
    ///   `ActivationRequest` handler. The active set is left untouched.
    pub fn activate_plugin(
        &mut self,
        owner: &Rc<GrabInterface>,
        lower_fullscreen: bool,
    ) -> Result<(), ActivationError> {
        let output_id = owner.output();
        let was_empty = match self.admit(owner)? {
            Admission::AlreadyActive => return Ok(()),
            Admission::Admitted { was_empty } => was_empty,
        };

        if lower_fullscreen && was_empty {
            self.emit_output_signal(output_id, OutputSignal::ActivationRequest { lower_fullscreen });
            // Signal handlers may have changed the active set.
            if let Admission::AlreadyActive = self.admit(owner)? {
                return Ok(());
            }
        }

        self.outputs
            .get_mut(&output_id)
            .ok_or(ActivationError::UnknownOutput(output_id))?
            .active_plugins
            .push(Rc::downgrade(owner));
        info!(plugin = owner.name(), output = %output_id, "Plugin activated");
        Ok(())
    }

    /// Checks `owner` against the live active set of its output.
    fn admit(&mut self, owner: &Rc<GrabInterface>) -> Result<Admission, ActivationError> {
        let output_id = owner.output();
        let scheme = self.config.plugins.compatibility;
        let output = self
            .outputs
            .get_mut(&output_id)
            .ok_or(ActivationError::UnknownOutput(output_id))?;

        output.active_plugins.retain(|w| w.strong_count() > 0);
        if output.active_plugins.iter().any(|w| same_iface(w, owner)) {
            debug!(plugin = owner.name(), "Plugin already active");
            return Ok(Admission::AlreadyActive);
        }
        for active in output.active_plugins.iter().filter_map(Weak::upgrade) {
            if !owner.is_compatible_with(&active, scheme) {
                debug!(plugin = owner.name(), blocker = active.name(), "Activation refused");
                return Err(ActivationError::Incompatible {
                    requested: owner.name().to_string(),
                    active: active.name().to_string(),
                });
            }
        }
        Ok(Admission::Admitted {
            was_empty: output.active_plugins.is_empty(),
        })
    }

    /// Deactivates `owner`: its handler's release hook runs, any grab it
    /// holds is released, and it leaves the active set. Emits
    /// [`OutputSignal::ActivationResumed`] when the set becomes empty.
    ///
    /// Always succeeds; deactivating an inactive plugin does nothing.
    pub fn deactivate_plugin(&mut self, owner: &Rc<GrabInterface>) -> bool {
        let output_id = owner.output();
        let is_active = self
            .outputs
            .get(&output_id)
            .is_some_and(|o| o.active_plugins.iter().any(|w| same_iface(w, owner)));
        if !is_active {
            return true;
        }

        owner.handler().release(self);
        self.ungrab(owner);

        let Some(output) = self.outputs.get_mut(&output_id) else {
            return true;
        };
        output
            .active_plugins
            .retain(|w| w.strong_count() > 0 && !same_iface(w, owner));
        let now_empty = output.active_plugins.is_empty();
        info!(plugin = owner.name(), output = %output_id, "Plugin deactivated");
        if now_empty {
            self.emit_output_signal(output_id, OutputSignal::ActivationResumed);
        }
        true
    }

    /// Whether a plugin named `name` is active on `output`.
    pub fn is_plugin_active(&self, output: OutputId, name: &str) -> bool {
        self.active_plugins(output).iter().any(|p| p.name() == name)
    }

    /// Live active plugins of `output`, in activation order.
    pub fn active_plugins(&self, output: OutputId) -> Vec<Rc<GrabInterface>> {
        self.outputs
            .get(&output)
            .map(|o| o.active_plugins.iter().filter_map(Weak::upgrade).collect())
            .unwrap_or_default()
    }

    /// The first active plugin of `output` that wants the input grab.
    pub fn input_grab_interface(&self, output: OutputId) -> Option<Rc<GrabInterface>> {
        self.active_plugins(output).into_iter().find(|p| p.wants_grab())
    }
}
