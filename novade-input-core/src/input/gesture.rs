//! Multi-finger gesture recognition.
//!
//! Once at least `min_fingers` touch points are down, the touch router stops
//! delivering them to clients and feeds their motion to a
//! [`GestureRecognizer`]. The recognizer classifies the motion as
//!
//! * a **swipe**, when every finger travelled at least `swipe_distance` in the
//!   same direction,
//! * an **edge swipe**, a swipe whose fingers all started within
//!   `edge_threshold` of the output edge opposite to the swipe direction
//!   (a swipe up from the bottom edge, for example),
//! * a **pinch**, when the summed finger-to-centroid distance shrank (`IN`) or
//!   grew (`OUT`) by at least `pinch_distance`.
//!
//! At most one gesture is reported per gesture session. A new session starts
//! only after the finger count drops below `min_fingers` and reaches it again.

use bitflags::bitflags;
use std::collections::BTreeMap;

use crate::config::GestureConfig;
use crate::input::touch::Finger;
use crate::types::{Geometry, Point};

bitflags! {
    /// Direction(s) of a recognized gesture.
    ///
    /// Swipes may combine a horizontal and a vertical direction when the
    /// fingers moved diagonally. Pinches carry exactly one of `IN` / `OUT`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GestureDirection: u32 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
        const IN = 1 << 4;
        const OUT = 1 << 5;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureType {
    Swipe,
    EdgeSwipe,
    Pinch,
}

/// A recognized gesture, also used as the descriptor when registering a
/// gesture binding (where `direction` is ignored).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    pub kind: GestureType,
    pub finger_count: usize,
    pub direction: GestureDirection,
}

impl Gesture {
    pub fn new(kind: GestureType, finger_count: usize, direction: GestureDirection) -> Self {
        Self {
            kind,
            finger_count,
            direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Tracking,
    /// A gesture was reported for the current session.
    Emitted,
}

#[derive(Debug)]
pub(crate) struct GestureRecognizer {
    config: GestureConfig,
    phase: Phase,
    baseline_spread: f64,
}

impl GestureRecognizer {
    pub(crate) fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            baseline_spread: 0.0,
        }
    }

    pub(crate) fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub(crate) fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Starts a new gesture session over `fingers`.
    pub(crate) fn begin(&mut self, fingers: &mut BTreeMap<i32, Finger>) {
        self.phase = Phase::Tracking;
        self.rebaseline(fingers);
    }

    /// Resets every finger's start point to its current position and
    /// recomputes the pinch baseline. Called whenever a finger joins or leaves
    /// an ongoing session. A gesture already reported stays reported.
    pub(crate) fn rebaseline(&mut self, fingers: &mut BTreeMap<i32, Finger>) {
        for finger in fingers.values_mut() {
            finger.start = finger.current;
        }
        self.baseline_spread = spread(fingers);
    }

    pub(crate) fn end(&mut self) {
        self.phase = Phase::Idle;
        self.baseline_spread = 0.0;
    }

    /// Classifies the current finger motion. Returns a gesture at most once
    /// per session.
    pub(crate) fn update(
        &mut self,
        fingers: &BTreeMap<i32, Finger>,
        output: Option<Geometry>,
    ) -> Option<Gesture> {
        if self.phase != Phase::Tracking {
            return None;
        }
        let gesture = self.classify(fingers, output)?;
        self.phase = Phase::Emitted;
        Some(gesture)
    }

    fn classify(&self, fingers: &BTreeMap<i32, Finger>, output: Option<Geometry>) -> Option<Gesture> {
        let finger_count = fingers.len();
        if finger_count == 0 {
            return None;
        }

        let swipe = swipe_direction(fingers, self.config.swipe_distance);
        if !swipe.is_empty() {
            let edges = output
                .map(|geometry| edge_directions(fingers, geometry, self.config.edge_threshold))
                .unwrap_or_else(GestureDirection::empty);
            let kind = if !edges.is_empty() && edges.contains(swipe) {
                GestureType::EdgeSwipe
            } else {
                GestureType::Swipe
            };
            return Some(Gesture::new(kind, finger_count, swipe));
        }

        let shrink = self.baseline_spread - spread(fingers);
        if shrink >= self.config.pinch_distance {
            Some(Gesture::new(GestureType::Pinch, finger_count, GestureDirection::IN))
        } else if shrink <= -self.config.pinch_distance {
            Some(Gesture::new(GestureType::Pinch, finger_count, GestureDirection::OUT))
        } else {
            None
        }
    }
}

fn centroid(fingers: &BTreeMap<i32, Finger>) -> Point {
    let n = fingers.len().max(1) as f64;
    let (sx, sy) = fingers
        .values()
        .fold((0.0, 0.0), |(sx, sy), f| (sx + f.current.x, sy + f.current.y));
    Point::new(sx / n, sy / n)
}

/// Sum of the distances of every finger to the centroid.
fn spread(fingers: &BTreeMap<i32, Finger>) -> f64 {
    let center = centroid(fingers);
    fingers.values().map(|f| f.current.distance_to(center)).sum()
}

/// Directions that every finger travelled at least `threshold` in.
fn swipe_direction(fingers: &BTreeMap<i32, Finger>, threshold: f64) -> GestureDirection {
    let all = GestureDirection::LEFT | GestureDirection::RIGHT | GestureDirection::UP | GestureDirection::DOWN;
    fingers.values().fold(all, |acc, finger| {
        let dx = finger.current.x - finger.start.x;
        let dy = finger.current.y - finger.start.y;
        let mut dir = GestureDirection::empty();
        if dx <= -threshold {
            dir |= GestureDirection::LEFT;
        }
        if dx >= threshold {
            dir |= GestureDirection::RIGHT;
        }
        if dy <= -threshold {
            dir |= GestureDirection::UP;
        }
        if dy >= threshold {
            dir |= GestureDirection::DOWN;
        }
        acc & dir
    })
}

/// Swipe directions that lead away from an edge every finger started near.
/// Bottom maps to `UP`, top to `DOWN`, left to `RIGHT`, right to `LEFT`.
fn edge_directions(fingers: &BTreeMap<i32, Finger>, output: Geometry, threshold: f64) -> GestureDirection {
    let left = f64::from(output.x);
    let top = f64::from(output.y);
    let right = left + f64::from(output.width);
    let bottom = top + f64::from(output.height);

    let all = GestureDirection::LEFT | GestureDirection::RIGHT | GestureDirection::UP | GestureDirection::DOWN;
    fingers.values().fold(all, |acc, finger| {
        let p = finger.start;
        let mut near = GestureDirection::empty();
        if p.x - left <= threshold {
            near |= GestureDirection::RIGHT;
        }
        if right - p.x <= threshold {
            near |= GestureDirection::LEFT;
        }
        if p.y - top <= threshold {
            near |= GestureDirection::DOWN;
        }
        if bottom - p.y <= threshold {
            near |= GestureDirection::UP;
        }
        acc & near
    })
}
