//! # Novade Input Core
//!
//! This crate is the input-routing and exclusivity-arbitration core of the
//! Novade Wayland compositor. For every raw input event delivered by the host
//! runtime it decides exactly one destination:
//! - the focused client surface (through a [`ClientSink`]),
//! - the exclusive grab held by a compositor plugin (a [`GrabInterface`]),
//! - or internal consumption by the multi-finger [`gesture`] recognizer.
//!
//! It also arbitrates which plugins may be active at the same time on an
//! output, dispatches key/button/touch/gesture bindings to the focused output,
//! and suspends the active grab while the compositor does not own the display
//! hardware (session / VT switch).
//!
//! Everything hangs off one explicitly constructed context, [`Core`]. Plugin
//! callbacks receive `&mut Core`, so plugins call back into the core (to grab,
//! ungrab, activate or register bindings) without any global lookup.
//!
//! ```rust,ignore
//! use novade_input_core::{Core, InputCoreConfig, Geometry, OutputId};
//!
//! let mut core = Core::new(InputCoreConfig::default(), Box::new(seat));
//! core.add_output(OutputId(0), Geometry::new(0, 0, 1920, 1080), plugins)?;
//!
//! // Host runtime, once per raw event:
//! core.touch_down(event);
//! // ...and once per event-loop turn:
//! core.dispatch_idle();
//! ```

pub mod activation;
pub mod callback;
pub mod config;
pub mod context;
mod deferred;
pub mod error;
pub mod input;
pub mod logging;
pub mod output;
pub mod plugin;
pub mod process;
pub mod shell;
pub mod types;

pub use crate::callback::Callback;
pub use crate::config::{CompatibilityScheme, GestureConfig, InputCoreConfig, LoggingConfig};
pub use crate::context::Core;
pub use crate::error::{ActivationError, ConfigError, GrabError, InputCoreError};
pub use crate::input::bindings::{
    BindingId, BindingRegistry, ButtonCallback, GestureCallback, KeyCallback, TouchCallback,
};
pub use crate::input::gesture::{Gesture, GestureDirection, GestureType};
pub use crate::input::grab::{Abilities, GrabHandler, GrabInterface, GrabProfile};
pub use crate::input::seat::{ClientEvent, ClientSink, NullSink};
pub use crate::input::touch::{Finger, TouchDestination};
pub use crate::output::{Output, OutputSignal, SignalCallback, SignalId};
pub use crate::plugin::{Plugin, PluginFactory, PLUGIN_ENTRY_SYMBOL};
pub use crate::shell::{ShellClient, ShellClientId};
pub use crate::types::{
    Axis, AxisSource, ButtonState, Geometry, KeyEvent, KeyState, Modifiers, ModifiersState,
    OutputId, Point, PointerAxisEvent, PointerButtonEvent, PointerMotionEvent, TouchDownEvent,
    TouchMotionEvent, TouchUpEvent,
};
