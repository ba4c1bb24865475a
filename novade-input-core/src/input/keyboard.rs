//! Keyboard entry points.
//!
//! Key presses are matched against key bindings with the effective modifier
//! state. A press that fires a binding is consumed together with its release.

use tracing::trace;

use crate::context::Core;
use crate::input::seat::ClientEvent;
use crate::types::{KeyEvent, KeyState, ModifiersState};

impl Core {
    /// Current keyboard modifier state, as last reported by the host.
    pub fn modifiers(&self) -> ModifiersState {
        self.modifiers
    }

    pub fn keyboard_key(&mut self, event: KeyEvent) {
        if !self.session_active() {
            trace!(key = event.key, "Session inactive, dropping key");
            return;
        }
        let pressed = event.state == KeyState::Pressed;
        let was_consumed = !pressed && self.consumed_keys.remove(&event.key);

        if self.live_grab().is_some() {
            if pressed && !self.grab.is_finalized() {
                self.run_key_bindings(&event);
            }
            if let Some(grab) = self.live_grab() {
                grab.handler().key(self, &event);
                return;
            }
            if pressed {
                self.consumed_keys.insert(event.key);
            }
            return;
        }

        if pressed && self.run_key_bindings(&event) {
            self.consumed_keys.insert(event.key);
            return;
        }
        if was_consumed {
            return;
        }
        self.sink.send(ClientEvent::Key(event));
    }

    /// Modifier state changed. Always recorded for binding matching, then
    /// forwarded to the grab or the client.
    pub fn keyboard_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = state;
        if !self.session_active() {
            return;
        }
        match self.live_grab() {
            Some(grab) => grab.handler().modifiers(self, &state),
            None => self.sink.send(ClientEvent::Modifiers(state)),
        }
    }

    /// The keyboard device went away mid-sequence.
    pub fn keyboard_cancel(&mut self) {
        self.consumed_keys.clear();
        self.end_grabs();
    }
}
