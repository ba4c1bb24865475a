//! Plain data types shared across the input core: identifiers, geometry,
//! keyboard modifier state, and the raw input events delivered by the host
//! runtime.

use bitflags::bitflags;
use std::fmt;

/// Identifier of an output (monitor) owned by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutputId(pub u32);

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output-{}", self.0)
    }
}

/// A position in global compositor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Rectangle of an output in the global layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Geometry {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= f64::from(self.x)
            && point.y >= f64::from(self.y)
            && point.x < f64::from(self.x) + f64::from(self.width)
            && point.y < f64::from(self.y) + f64::from(self.height)
    }
}

bitflags! {
    /// Compositor-level keyboard modifiers used to match bindings.
    ///
    /// The host runtime translates its keymap state into these flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        const CTRL = 1 << 0;
        const ALT = 1 << 1;
        const SUPER = 1 << 2;
        const SHIFT = 1 << 3;
    }
}

/// State of the keyboard modifiers, as sent in a modifiers event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifiersState {
    /// Modifiers whose keys are physically held down.
    pub depressed: Modifiers,
    /// Modifiers that activate on the next key press.
    pub latched: Modifiers,
    /// Modifiers that remain active until unset.
    pub locked: Modifiers,
    /// Effective layout group.
    pub group: u32,
}

impl ModifiersState {
    /// Modifiers in effect for binding matching.
    pub fn effective(&self) -> Modifiers {
        self.depressed | self.latched | self.locked
    }

    /// The same state with nothing held down. Sent to clients when a grab
    /// ends so no modifier stays stuck from the client's point of view.
    pub fn released(&self) -> Self {
        Self {
            depressed: Modifiers::empty(),
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    Released,
    Pressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonState {
    Released,
    Pressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisSource {
    Wheel,
    Finger,
    Continuous,
    WheelTilt,
}

// --- Raw events delivered by the host runtime ---

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMotionEvent {
    /// Timestamp with millisecond granularity.
    pub time_ms: u32,
    /// New cursor position in global coordinates.
    pub position: Point,
    /// Unaccelerated relative motion.
    pub delta: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerButtonEvent {
    pub time_ms: u32,
    /// Button code (e.g. `BTN_LEFT` from `input-event-codes.h`).
    pub button: u32,
    pub state: ButtonState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerAxisEvent {
    pub time_ms: u32,
    pub axis: Axis,
    pub value: f64,
    /// Discrete steps for wheel sources.
    pub discrete: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub time_ms: u32,
    /// Key code (e.g. `KEY_A` from `input-event-codes.h`).
    pub key: u32,
    pub state: KeyState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchDownEvent {
    pub time_ms: u32,
    /// Touch point id, unique while the finger stays on the surface.
    pub id: i32,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchMotionEvent {
    pub time_ms: u32,
    pub id: i32,
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchUpEvent {
    pub time_ms: u32,
    pub id: i32,
}
