//! Exclusive input grabs.
//!
//! A plugin that needs all input for itself (an interactive move, a window
//! switcher, an overview) owns a [`GrabInterface`] and asks the core to grab
//! input. While a grab is active, pointer, keyboard and new touch input is
//! routed to its [`GrabHandler`] instead of clients. At most one grab is
//! active at any time.
//!
//! Grab admission happens in two steps. [`Core::grab_input`] installs the
//! grab immediately; a deferred task run from [`Core::dispatch_idle`] then
//! *finalizes* it. Until finalization, key and button presses are still
//! checked against bindings before reaching the grab, so the binding that
//! started the grab on this event-loop turn and its immediate follow-up
//! behave as the user expects.

use bitflags::bitflags;
use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, info, warn};

use crate::config::CompatibilityScheme;
use crate::context::Core;
use crate::error::GrabError;
use crate::input::seat::ClientEvent;
use crate::input::touch::{GrabReplay, TouchDestination};
use crate::types::{
    AxisSource, KeyEvent, ModifiersState, OutputId, Point, PointerAxisEvent, PointerButtonEvent,
    PointerMotionEvent,
};

bitflags! {
    /// Capabilities a plugin exercises while active. Two plugins whose
    /// ability masks intersect cannot be active on the same output.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Abilities: u32 {
        /// Takes over window-management decisions.
        const CONTROL_WM = 1 << 0;
        /// Needs exclusive pointer/keyboard input.
        const GRAB_INPUT = 1 << 1;
        /// Renders the output itself.
        const CUSTOM_RENDERING = 1 << 2;
        /// Moves or resizes views.
        const CHANGE_VIEW_GEOMETRY = 1 << 3;
    }
}

/// Receives input while its [`GrabInterface`] holds the grab.
///
/// Every method has an empty default so handlers implement only what they
/// care about. Methods take `&self`; handlers keep mutable state in `Cell` or
/// `RefCell`. The core passes itself so handlers can react, for example by
/// ungrabbing on a button release.
pub trait GrabHandler {
    fn pointer_motion(&self, _core: &mut Core, _event: &PointerMotionEvent) {}
    fn pointer_button(&self, _core: &mut Core, _event: &PointerButtonEvent) {}
    fn pointer_axis(&self, _core: &mut Core, _event: &PointerAxisEvent) {}
    fn pointer_axis_source(&self, _core: &mut Core, _source: AxisSource) {}
    fn pointer_frame(&self, _core: &mut Core) {}
    fn key(&self, _core: &mut Core, _event: &KeyEvent) {}
    fn modifiers(&self, _core: &mut Core, _state: &ModifiersState) {}
    fn touch_down(&self, _core: &mut Core, _id: i32, _position: Point) {}
    fn touch_up(&self, _core: &mut Core, _id: i32) {}
    fn touch_motion(&self, _core: &mut Core, _id: i32, _position: Point) {}
    fn touch_frame(&self, _core: &mut Core) {}
    /// The grab is being forcibly ended (device removal, shutdown).
    fn cancel(&self, _core: &mut Core) {}
    /// The owning plugin is being deactivated.
    fn release(&self, _core: &mut Core) {}
}

/// Activation traits a plugin declares up front, usually in its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrabProfile {
    pub abilities: Abilities,
    /// Plugins accepted next to this one under the named scheme.
    pub compat: Vec<String>,
    pub compat_all: bool,
}

impl Default for GrabProfile {
    fn default() -> Self {
        Self {
            abilities: Abilities::empty(),
            compat: Vec::new(),
            compat_all: true,
        }
    }
}

/// A plugin's handle for activation and exclusive input.
///
/// The plugin owns the interface through an `Rc`; the core keeps only weak
/// references in its active-grab slot and the per-output active sets.
pub struct GrabInterface {
    name: String,
    output: OutputId,
    abilities: Abilities,
    compat: HashSet<String>,
    compat_all: bool,
    wants_grab: Cell<bool>,
    handler: Rc<dyn GrabHandler>,
}

impl GrabInterface {
    pub fn new(name: impl Into<String>, output: OutputId, handler: Rc<dyn GrabHandler>) -> Self {
        Self {
            name: name.into(),
            output,
            abilities: Abilities::empty(),
            compat: HashSet::new(),
            compat_all: true,
            wants_grab: Cell::new(false),
            handler,
        }
    }

    pub fn with_abilities(mut self, abilities: Abilities) -> Self {
        self.abilities = abilities;
        self
    }

    /// Restricts named compatibility to the given plugins.
    pub fn with_compat<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compat = names.into_iter().map(Into::into).collect();
        self.compat_all = false;
        self
    }

    /// Applies a declared profile, replacing abilities and compatibility.
    pub fn with_profile(mut self, profile: &GrabProfile) -> Self {
        self.abilities = profile.abilities;
        self.compat = profile.compat.iter().cloned().collect();
        self.compat_all = profile.compat_all;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output(&self) -> OutputId {
        self.output
    }

    pub fn abilities(&self) -> Abilities {
        self.abilities
    }

    pub fn handler(&self) -> Rc<dyn GrabHandler> {
        Rc::clone(&self.handler)
    }

    /// Whether the owning plugin currently asks for exclusive input.
    pub fn wants_grab(&self) -> bool {
        self.wants_grab.get()
    }

    pub fn set_wants_grab(&self, wants: bool) {
        self.wants_grab.set(wants);
    }

    /// Whether this interface may be active next to `other`.
    ///
    /// Under [`CompatibilityScheme::Named`] both sides must accept each other,
    /// either by listing the other's name or by accepting everyone.
    pub fn is_compatible_with(&self, other: &GrabInterface, scheme: CompatibilityScheme) -> bool {
        match scheme {
            CompatibilityScheme::Abilities => (self.abilities & other.abilities).is_empty(),
            CompatibilityScheme::Named => self.accepts(other) && other.accepts(self),
        }
    }

    fn accepts(&self, other: &GrabInterface) -> bool {
        self.compat_all || self.compat.contains(&other.name)
    }
}

impl fmt::Debug for GrabInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrabInterface")
            .field("name", &self.name)
            .field("output", &self.output)
            .field("abilities", &self.abilities)
            .field("wants_grab", &self.wants_grab.get())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub(crate) struct GrabState {
    active: Option<Weak<GrabInterface>>,
    finalized: bool,
    /// Bumped on every grab so a stale finalize task is ignored.
    generation: u64,
}

impl GrabState {
    pub(crate) fn is_finalized(&self) -> bool {
        self.finalized
    }
}

impl Core {
    /// Makes `iface` the exclusive input grab.
    ///
    /// Pointer focus moves to the neutral background, fingers held on clients
    /// are replayed to the grab, and finalization is scheduled for the next
    /// [`Core::dispatch_idle`].
    ///
    /// # Errors
    ///
    /// * `GrabError::NotRequested` if `iface` does not want a grab.
    /// * `GrabError::SessionInactive` while the session is inactive.
    /// * `GrabError::AlreadyGrabbed` if any interface already holds the grab.
    pub fn grab_input(&mut self, iface: &Rc<GrabInterface>) -> Result<(), GrabError> {
        if !iface.wants_grab() {
            return Err(GrabError::NotRequested {
                name: iface.name.clone(),
            });
        }
        if !self.session_active() {
            return Err(GrabError::SessionInactive);
        }
        if let Some(active) = self.live_grab() {
            return Err(GrabError::AlreadyGrabbed {
                active: active.name.clone(),
                requested: iface.name.clone(),
            });
        }

        self.grab.active = Some(Rc::downgrade(iface));
        self.grab.finalized = false;
        self.grab.generation += 1;
        let generation = self.grab.generation;

        self.sink.send(ClientEvent::PointerFocusCleared);
        let time_ms = self.touch.last_time_ms();
        for replay in self.touch.start_grab() {
            match replay {
                GrabReplay::ClientUp { id } => {
                    self.deliver_touch_up(time_ms, id, TouchDestination::Client)
                }
                GrabReplay::GrabDown { id, position } => {
                    self.deliver_touch_down(time_ms, id, position, TouchDestination::Grab)
                }
            }
        }

        self.defer(move |core| core.finalize_grab(generation));
        info!(plugin = %iface.name, output = %iface.output, "Input grabbed");
        Ok(())
    }

    fn finalize_grab(&mut self, generation: u64) {
        if self.grab.generation == generation && self.grab.active.is_some() {
            self.grab.finalized = true;
            debug!("Input grab finalized");
        }
    }

    /// Ends the active grab, if any.
    ///
    /// Clients are told that no modifier is held anymore, and touch input
    /// returns to clients for new fingers.
    pub fn ungrab_input(&mut self) {
        let previous = self.grab.active.take();
        self.grab.finalized = false;
        self.touch.end_grab();
        self.sink.send(ClientEvent::Modifiers(self.modifiers.released()));
        if let Some(iface) = previous.and_then(|weak| weak.upgrade()) {
            info!(plugin = %iface.name, "Input ungrabbed");
        }
    }

    /// `true` while a grab is active or the session is inactive; in both
    /// cases clients receive no input.
    pub fn input_grabbed(&self) -> bool {
        self.active_grab().is_some() || !self.session_active()
    }

    /// The interface holding the grab.
    pub fn active_grab(&self) -> Option<Rc<GrabInterface>> {
        self.grab.active.as_ref().and_then(Weak::upgrade)
    }

    /// Whether the active grab has passed its finalization step.
    pub fn grab_finalized(&self) -> bool {
        self.grab.is_finalized()
    }

    /// Like [`Core::active_grab`], but releases a grab whose owner was
    /// dropped without ungrabbing.
    pub(crate) fn live_grab(&mut self) -> Option<Rc<GrabInterface>> {
        match self.grab.active.as_ref().map(Weak::upgrade) {
            Some(Some(iface)) => Some(iface),
            Some(None) => {
                warn!("Grab owner was dropped while holding the grab, releasing it");
                self.ungrab_input();
                None
            }
            None => None,
        }
    }

    /// Forcibly ends the active grab: its handler is cancelled and its owner
    /// no longer wants the grab.
    pub fn end_grabs(&mut self) {
        if let Some(iface) = self.live_grab() {
            iface.handler().cancel(self);
            self.ungrab(&iface);
        }
    }

    /// Plugin-facing request for exclusive input.
    ///
    /// The interface must be active on its output. The grab is installed
    /// right away when that output is focused; otherwise it is installed
    /// when the output gains focus.
    pub fn grab(&mut self, iface: &Rc<GrabInterface>) -> Result<(), GrabError> {
        if !self.is_plugin_active(iface.output, &iface.name) {
            return Err(GrabError::PluginInactive {
                name: iface.name.clone(),
            });
        }
        if let Some(active) = self.active_grab() {
            if Rc::ptr_eq(&active, iface) {
                return Ok(());
            }
        }

        iface.set_wants_grab(true);
        if self.focused_output() != Some(iface.output) {
            debug!(plugin = %iface.name, "Grab deferred until output {} is focused", iface.output);
            return Ok(());
        }
        self.grab_input(iface).map_err(|e| {
            iface.set_wants_grab(false);
            e
        })
    }

    /// Plugin-facing release of exclusive input. Does nothing if `iface`
    /// does not want a grab.
    pub fn ungrab(&mut self, iface: &Rc<GrabInterface>) {
        if !iface.wants_grab() {
            return;
        }
        iface.set_wants_grab(false);
        if let Some(active) = self.active_grab() {
            if Rc::ptr_eq(&active, iface) {
                self.ungrab_input();
            }
        }
        self.forget_suspended_grab(iface);
    }
}
