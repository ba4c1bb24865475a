//! The client-facing side of the seat.
//!
//! The core does not talk the Wayland wire protocol itself. Whatever reaches
//! the focused client is handed to a [`ClientSink`] supplied by the host
//! runtime, which forwards it to the client that currently has seat focus.

use crate::types::{
    AxisSource, KeyEvent, ModifiersState, Point, PointerAxisEvent, PointerButtonEvent,
    PointerMotionEvent,
};

/// An input event addressed to the focused client.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    PointerMotion(PointerMotionEvent),
    PointerButton(PointerButtonEvent),
    PointerAxis(PointerAxisEvent),
    PointerAxisSource(AxisSource),
    PointerFrame,
    /// Pointer focus moved to the neutral background target. Sent when an
    /// exclusive grab starts, so no client keeps a hover or drag state.
    PointerFocusCleared,
    Key(KeyEvent),
    Modifiers(ModifiersState),
    TouchDown { time_ms: u32, id: i32, position: Point },
    TouchUp { time_ms: u32, id: i32 },
    TouchMotion { time_ms: u32, id: i32, position: Point },
    TouchFrame,
    TouchCancel,
}

/// Receiver of client-bound input, implemented by the host runtime.
pub trait ClientSink {
    fn send(&mut self, event: ClientEvent);
}

/// A sink that drops everything. Useful for headless setups.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ClientSink for NullSink {
    fn send(&mut self, _event: ClientEvent) {}
}
