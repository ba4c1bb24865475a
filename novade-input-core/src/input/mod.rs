//! Input routing for the Novade compositor.
//!
//! This module is responsible for:
//! - Delivering raw pointer, keyboard and touch events to exactly one
//!   destination: the client seat, the active exclusive grab, or the gesture
//!   recognizer.
//! - Admitting, finalizing and releasing the exclusive input grab.
//! - Matching key, button, touch and gesture bindings on the focused output.
//! - Suspending the grab while the session is inactive.

pub mod bindings;
pub mod gesture;
pub mod grab;
pub mod keyboard;
pub mod pointer;
pub mod seat;
pub mod session;
pub mod touch;
