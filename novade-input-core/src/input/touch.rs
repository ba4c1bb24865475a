//! Touch routing.
//!
//! Every touch point ("finger") is delivered to exactly one destination at a
//! time: the focused client, the active grab, or nobody while a multi-finger
//! gesture is being recognized. [`TouchRouter`] holds the per-finger state and
//! decides the destination; the `touch_*` entry points on [`Core`] apply those
//! decisions and run touch bindings.
//!
//! The rules:
//! - When the finger count reaches `min_fingers`, fingers already delivered
//!   somewhere receive a synthetic up there and stop being delivered.
//! - While a gesture is being recognized, new fingers are not delivered.
//! - While a grab is active, new fingers go to the grab.
//! - When a grab starts, client fingers receive a synthetic up and are
//!   replayed to the grab as a down, unless a gesture is in progress.

use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

use crate::config::GestureConfig;
use crate::context::Core;
use crate::input::gesture::{Gesture, GestureRecognizer};
use crate::input::seat::ClientEvent;
use crate::types::{Geometry, Point, TouchDownEvent, TouchMotionEvent, TouchUpEvent};

/// Where a finger's events are being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchDestination {
    Client,
    Grab,
}

/// One tracked touch point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finger {
    pub id: i32,
    /// Position where the finger touched down.
    pub initial: Point,
    /// Reference position of the current gesture session.
    pub start: Point,
    pub current: Point,
    pub(crate) sent_to_client: bool,
    pub(crate) sent_to_grab: bool,
}

impl Finger {
    pub(crate) fn new(id: i32, position: Point) -> Self {
        Self {
            id,
            initial: position,
            start: position,
            current: position,
            sent_to_client: false,
            sent_to_grab: false,
        }
    }

    /// The destination this finger's down was sent to, if any.
    pub fn destination(&self) -> Option<TouchDestination> {
        debug_assert!(!(self.sent_to_client && self.sent_to_grab));
        if self.sent_to_client {
            Some(TouchDestination::Client)
        } else if self.sent_to_grab {
            Some(TouchDestination::Grab)
        } else {
            None
        }
    }

    fn route_to(&mut self, destination: Option<TouchDestination>) {
        self.sent_to_client = destination == Some(TouchDestination::Client);
        self.sent_to_grab = destination == Some(TouchDestination::Grab);
    }
}

/// Touch ids below this one are "first-index" touches, the only ones that
/// are matched against touch bindings.
const FIRST_SECONDARY_TOUCH_ID: i32 = 1;

pub(crate) struct Registration {
    /// Fingers taken away from their destination by a starting gesture.
    pub(crate) taken_over: Vec<(i32, TouchDestination)>,
    /// Where the new finger should go, `None` if it is kept back.
    pub(crate) destination: Option<TouchDestination>,
    pub(crate) gesture_started: bool,
}

pub(crate) enum TouchMotion {
    Untracked,
    Consumed,
    Gesture(Gesture),
    Forward(TouchDestination),
}

/// Events to send when a grab takes over fingers held on clients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum GrabReplay {
    ClientUp { id: i32 },
    GrabDown { id: i32, position: Point },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PendingFrame {
    pub(crate) client: bool,
    pub(crate) grab: bool,
}

#[derive(Debug)]
pub(crate) struct TouchRouter {
    fingers: BTreeMap<i32, Finger>,
    recognizer: GestureRecognizer,
    grab_mode: bool,
    last_time_ms: u32,
    pending_frame: PendingFrame,
}

impl TouchRouter {
    pub(crate) fn new(config: GestureConfig) -> Self {
        Self {
            fingers: BTreeMap::new(),
            recognizer: GestureRecognizer::new(config),
            grab_mode: false,
            last_time_ms: 0,
            pending_frame: PendingFrame::default(),
        }
    }

    pub(crate) fn finger(&self, id: i32) -> Option<&Finger> {
        self.fingers.get(&id)
    }

    pub(crate) fn fingers(&self) -> impl Iterator<Item = &Finger> {
        self.fingers.values()
    }

    pub(crate) fn finger_count(&self) -> usize {
        self.fingers.len()
    }

    pub(crate) fn in_gesture(&self) -> bool {
        self.recognizer.is_active()
    }

    pub(crate) fn grab_mode(&self) -> bool {
        self.grab_mode
    }

    pub(crate) fn last_time_ms(&self) -> u32 {
        self.last_time_ms
    }

    /// Tracks a new finger and decides where it goes.
    pub(crate) fn register(&mut self, time_ms: u32, id: i32, position: Point) -> Registration {
        self.last_time_ms = time_ms;
        if self.fingers.contains_key(&id) {
            warn!(id, "Touch down for a finger that is already down, ignoring");
            return Registration {
                taken_over: Vec::new(),
                destination: None,
                gesture_started: false,
            };
        }
        self.fingers.insert(id, Finger::new(id, position));

        let mut taken_over = Vec::new();
        let mut gesture_started = false;
        if self.recognizer.is_active() {
            self.recognizer.rebaseline(&mut self.fingers);
        } else if self.fingers.len() >= self.recognizer.config().min_fingers {
            for finger in self.fingers.values_mut() {
                if let Some(destination) = finger.destination() {
                    taken_over.push((finger.id, destination));
                }
                finger.route_to(None);
            }
            self.recognizer.begin(&mut self.fingers);
            gesture_started = true;
        }

        let destination = if self.recognizer.is_active() {
            None
        } else if self.grab_mode {
            Some(TouchDestination::Grab)
        } else {
            Some(TouchDestination::Client)
        };

        Registration {
            taken_over,
            destination,
            gesture_started,
        }
    }

    /// Records that the finger's down was sent to `destination`.
    pub(crate) fn assign(&mut self, id: i32, destination: TouchDestination) {
        if let Some(finger) = self.fingers.get_mut(&id) {
            finger.route_to(Some(destination));
        }
    }

    pub(crate) fn motion(
        &mut self,
        time_ms: u32,
        id: i32,
        position: Point,
        output: Option<Geometry>,
    ) -> TouchMotion {
        self.last_time_ms = time_ms;
        let Some(finger) = self.fingers.get_mut(&id) else {
            return TouchMotion::Untracked;
        };
        finger.current = position;
        let destination = finger.destination();

        if self.recognizer.is_active() {
            return match self.recognizer.update(&self.fingers, output) {
                Some(gesture) => TouchMotion::Gesture(gesture),
                None => TouchMotion::Consumed,
            };
        }
        match destination {
            Some(destination) => TouchMotion::Forward(destination),
            None => TouchMotion::Consumed,
        }
    }

    /// Stops tracking a finger. Returns where its up must be sent.
    pub(crate) fn unregister(&mut self, time_ms: u32, id: i32) -> Option<TouchDestination> {
        self.last_time_ms = time_ms;
        let finger = self.fingers.remove(&id)?;
        if self.recognizer.is_active() {
            if self.fingers.len() < self.recognizer.config().min_fingers {
                self.recognizer.end();
            } else {
                self.recognizer.rebaseline(&mut self.fingers);
            }
            return None;
        }
        finger.destination()
    }

    /// Switches to grab mode and computes the replay for held fingers.
    pub(crate) fn start_grab(&mut self) -> Vec<GrabReplay> {
        self.grab_mode = true;
        let gesture = self.recognizer.is_active();
        let mut replay = Vec::new();
        for finger in self.fingers.values_mut() {
            if finger.sent_to_client {
                replay.push(GrabReplay::ClientUp { id: finger.id });
                finger.sent_to_client = false;
            }
            if !gesture && !finger.sent_to_grab {
                replay.push(GrabReplay::GrabDown {
                    id: finger.id,
                    position: finger.current,
                });
                finger.sent_to_grab = true;
            }
        }
        replay
    }

    /// Fingers routed to the grab stay marked; their ups are dropped.
    pub(crate) fn end_grab(&mut self) {
        self.grab_mode = false;
    }

    /// Forgets every finger, returning those that had a destination.
    pub(crate) fn cancel(&mut self) -> Vec<(i32, TouchDestination)> {
        self.recognizer.end();
        std::mem::take(&mut self.fingers)
            .into_values()
            .filter_map(|f| f.destination().map(|d| (f.id, d)))
            .collect()
    }

    pub(crate) fn mark_frame_pending(&mut self, destination: TouchDestination) {
        match destination {
            TouchDestination::Client => self.pending_frame.client = true,
            TouchDestination::Grab => self.pending_frame.grab = true,
        }
    }

    pub(crate) fn take_pending_frame(&mut self) -> PendingFrame {
        std::mem::take(&mut self.pending_frame)
    }
}

fn is_first_index(id: i32) -> bool {
    id < FIRST_SECONDARY_TOUCH_ID
}

impl Core {
    /// Handles a raw touch down from the host runtime.
    pub fn touch_down(&mut self, event: TouchDownEvent) {
        if !self.session_active() {
            trace!(id = event.id, "Session inactive, dropping touch down");
            return;
        }

        let registration = self.touch.register(event.time_ms, event.id, event.position);
        for (id, destination) in registration.taken_over {
            self.deliver_touch_up(event.time_ms, id, destination);
        }
        if registration.gesture_started {
            debug!(fingers = self.touch.finger_count(), "Gesture session started");
        }
        let Some(mut destination) = registration.destination else {
            return;
        };

        if destination == TouchDestination::Client && is_first_index(event.id) {
            self.run_touch_bindings(event.position);
            if self.touch.grab_mode() {
                destination = TouchDestination::Grab;
            }
        }

        // A grab started by a binding has already replayed this finger.
        let current = self.touch.finger(event.id).and_then(Finger::destination);
        if current == Some(TouchDestination::Grab) {
            return;
        }

        self.touch.assign(event.id, destination);
        self.deliver_touch_down(event.time_ms, event.id, event.position, destination);
    }

    pub fn touch_motion(&mut self, event: TouchMotionEvent) {
        if !self.session_active() {
            // Fingers were cancelled when the session went away.
            return;
        }
        let output = self.focused_output_geometry();
        match self.touch.motion(event.time_ms, event.id, event.position, output) {
            TouchMotion::Untracked => trace!(id = event.id, "Motion for unknown touch point"),
            TouchMotion::Consumed => {}
            TouchMotion::Gesture(gesture) => self.emit_gesture(&gesture),
            TouchMotion::Forward(TouchDestination::Client) => {
                self.sink.send(ClientEvent::TouchMotion {
                    time_ms: event.time_ms,
                    id: event.id,
                    position: event.position,
                });
                self.touch.mark_frame_pending(TouchDestination::Client);
            }
            TouchMotion::Forward(TouchDestination::Grab) => {
                if let Some(grab) = self.live_grab() {
                    grab.handler().touch_motion(self, event.id, event.position);
                    self.touch.mark_frame_pending(TouchDestination::Grab);
                }
            }
        }
    }

    pub fn touch_up(&mut self, event: TouchUpEvent) {
        let destination = self.touch.unregister(event.time_ms, event.id);
        if !self.session_active() {
            trace!(id = event.id, "Session inactive, dropping touch up");
            return;
        }
        if let Some(destination) = destination {
            self.deliver_touch_up(event.time_ms, event.id, destination);
        }
    }

    /// Ends a batch of touch events. Forwarded to every destination that
    /// received touch events since the previous frame.
    pub fn touch_frame(&mut self) {
        let pending = self.touch.take_pending_frame();
        if pending.client {
            self.sink.send(ClientEvent::TouchFrame);
        }
        if pending.grab {
            if let Some(grab) = self.live_grab() {
                grab.handler().touch_frame(self);
            }
        }
    }

    /// The host runtime lost the touch device or its sequence.
    pub fn touch_cancel(&mut self) {
        let dropped = self.touch.cancel();
        let mut client_touched = false;
        for (id, destination) in dropped {
            match destination {
                TouchDestination::Client => client_touched = true,
                TouchDestination::Grab => {
                    if let Some(grab) = self.live_grab() {
                        grab.handler().touch_up(self, id);
                    }
                }
            }
        }
        if client_touched {
            self.sink.send(ClientEvent::TouchCancel);
        }
        self.touch.take_pending_frame();
    }

    pub(crate) fn deliver_touch_down(
        &mut self,
        time_ms: u32,
        id: i32,
        position: Point,
        destination: TouchDestination,
    ) {
        match destination {
            TouchDestination::Client => {
                self.sink.send(ClientEvent::TouchDown { time_ms, id, position })
            }
            TouchDestination::Grab => match self.live_grab() {
                Some(grab) => grab.handler().touch_down(self, id, position),
                None => return,
            },
        }
        self.touch.mark_frame_pending(destination);
    }

    pub(crate) fn deliver_touch_up(&mut self, time_ms: u32, id: i32, destination: TouchDestination) {
        match destination {
            TouchDestination::Client => self.sink.send(ClientEvent::TouchUp { time_ms, id }),
            TouchDestination::Grab => match self.live_grab() {
                Some(grab) => grab.handler().touch_up(self, id),
                None => return,
            },
        }
        self.touch.mark_frame_pending(destination);
    }
}
