//! Pointer entry points.
//!
//! Pointer events go to the active grab when there is one, otherwise to the
//! focused client. Button presses are matched against button bindings; a
//! press that fires a binding is not forwarded to the client, and neither is
//! its release.

use tracing::trace;

use crate::context::Core;
use crate::input::seat::ClientEvent;
use crate::types::{AxisSource, ButtonState, Point, PointerAxisEvent, PointerButtonEvent, PointerMotionEvent};

impl Core {
    /// Last known cursor position in global coordinates.
    pub fn cursor_position(&self) -> Point {
        self.cursor
    }

    pub fn pointer_motion(&mut self, event: PointerMotionEvent) {
        self.cursor = event.position;
        if !self.session_active() {
            return;
        }
        match self.live_grab() {
            Some(grab) => grab.handler().pointer_motion(self, &event),
            None => self.sink.send(ClientEvent::PointerMotion(event)),
        }
    }

    pub fn pointer_button(&mut self, event: PointerButtonEvent) {
        if !self.session_active() {
            trace!(button = event.button, "Session inactive, dropping button");
            return;
        }
        let pressed = event.state == ButtonState::Pressed;
        let was_consumed = !pressed && self.consumed_buttons.remove(&event.button);

        if self.live_grab().is_some() {
            if pressed && !self.grab.is_finalized() {
                self.run_button_bindings(&event);
            }
            // A binding may have released the grab.
            if let Some(grab) = self.live_grab() {
                grab.handler().pointer_button(self, &event);
                return;
            }
            if pressed {
                self.consumed_buttons.insert(event.button);
            }
            return;
        }

        if pressed && self.run_button_bindings(&event) {
            self.consumed_buttons.insert(event.button);
            return;
        }
        if was_consumed {
            return;
        }
        self.sink.send(ClientEvent::PointerButton(event));
    }

    pub fn pointer_axis(&mut self, event: PointerAxisEvent) {
        if !self.session_active() {
            return;
        }
        match self.live_grab() {
            Some(grab) => grab.handler().pointer_axis(self, &event),
            None => self.sink.send(ClientEvent::PointerAxis(event)),
        }
    }

    pub fn pointer_axis_source(&mut self, source: AxisSource) {
        if !self.session_active() {
            return;
        }
        match self.live_grab() {
            Some(grab) => grab.handler().pointer_axis_source(self, source),
            None => self.sink.send(ClientEvent::PointerAxisSource(source)),
        }
    }

    pub fn pointer_frame(&mut self) {
        if !self.session_active() {
            return;
        }
        match self.live_grab() {
            Some(grab) => grab.handler().pointer_frame(self),
            None => self.sink.send(ClientEvent::PointerFrame),
        }
    }

    /// The pointer device went away mid-sequence.
    pub fn pointer_cancel(&mut self) {
        self.consumed_buttons.clear();
        self.end_grabs();
    }
}
