#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use novade_input_core::{
    Abilities, ButtonState, ClientEvent, ClientSink, Core, Geometry, GrabHandler, GrabInterface,
    InputCoreConfig, KeyEvent, KeyState, ModifiersState, OutputId, Point, PointerButtonEvent,
    TouchDownEvent, TouchMotionEvent, TouchUpEvent,
};

pub const OUT0: OutputId = OutputId(0);
pub const OUT1: OutputId = OutputId(1);
pub const SCREEN: Geometry = Geometry::new(0, 0, 1920, 1080);

pub type EventLog = Rc<RefCell<Vec<ClientEvent>>>;

/// Client seat double that records what reaches clients.
pub struct RecordingSink {
    events: EventLog,
}

impl RecordingSink {
    pub fn new() -> (Self, EventLog) {
        let events = EventLog::default();
        (
            Self {
                events: Rc::clone(&events),
            },
            events,
        )
    }
}

impl ClientSink for RecordingSink {
    fn send(&mut self, event: ClientEvent) {
        self.events.borrow_mut().push(event);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GrabEvent {
    Motion(Point),
    Button(u32, ButtonState),
    Key(u32, KeyState),
    Modifiers(ModifiersState),
    TouchDown(i32, Point),
    TouchUp(i32),
    TouchMotion(i32, Point),
    TouchFrame,
    Cancel,
    Release,
}

/// Grab handler double that records what reaches the grab.
#[derive(Default)]
pub struct RecordingGrab {
    pub events: RefCell<Vec<GrabEvent>>,
}

impl RecordingGrab {
    pub fn take(&self) -> Vec<GrabEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    fn push(&self, event: GrabEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl GrabHandler for RecordingGrab {
    fn pointer_motion(&self, _core: &mut Core, event: &novade_input_core::PointerMotionEvent) {
        self.push(GrabEvent::Motion(event.position));
    }
    fn pointer_button(&self, _core: &mut Core, event: &PointerButtonEvent) {
        self.push(GrabEvent::Button(event.button, event.state));
    }
    fn key(&self, _core: &mut Core, event: &KeyEvent) {
        self.push(GrabEvent::Key(event.key, event.state));
    }
    fn modifiers(&self, _core: &mut Core, state: &ModifiersState) {
        self.push(GrabEvent::Modifiers(*state));
    }
    fn touch_down(&self, _core: &mut Core, id: i32, position: Point) {
        self.push(GrabEvent::TouchDown(id, position));
    }
    fn touch_up(&self, _core: &mut Core, id: i32) {
        self.push(GrabEvent::TouchUp(id));
    }
    fn touch_motion(&self, _core: &mut Core, id: i32, position: Point) {
        self.push(GrabEvent::TouchMotion(id, position));
    }
    fn touch_frame(&self, _core: &mut Core) {
        self.push(GrabEvent::TouchFrame);
    }
    fn cancel(&self, _core: &mut Core) {
        self.push(GrabEvent::Cancel);
    }
    fn release(&self, _core: &mut Core) {
        self.push(GrabEvent::Release);
    }
}

/// A core with one focused 1920x1080 output and a recording sink.
pub fn core_with_output() -> (Core, EventLog) {
    core_with_config(InputCoreConfig::default())
}

pub fn core_with_config(config: InputCoreConfig) -> (Core, EventLog) {
    let (sink, events) = RecordingSink::new();
    let mut core = Core::new(config, Box::new(sink));
    core.add_output(OUT0, SCREEN, Vec::new()).unwrap();
    (core, events)
}

pub fn iface_on(name: &str, output: OutputId, abilities: Abilities) -> (Rc<GrabInterface>, Rc<RecordingGrab>) {
    let handler = Rc::new(RecordingGrab::default());
    let iface = Rc::new(
        GrabInterface::new(name, output, Rc::clone(&handler) as Rc<dyn GrabHandler>)
            .with_abilities(abilities),
    );
    (iface, handler)
}

pub fn iface(name: &str, abilities: Abilities) -> (Rc<GrabInterface>, Rc<RecordingGrab>) {
    iface_on(name, OUT0, abilities)
}

/// Activates `iface` and makes it hold the grab.
pub fn grabbed(core: &mut Core, name: &str) -> (Rc<GrabInterface>, Rc<RecordingGrab>) {
    let (iface, handler) = iface(name, Abilities::GRAB_INPUT);
    core.activate_plugin(&iface, false).unwrap();
    core.grab(&iface).unwrap();
    (iface, handler)
}

pub fn take(events: &EventLog) -> Vec<ClientEvent> {
    std::mem::take(&mut *events.borrow_mut())
}

pub fn down(core: &mut Core, id: i32, x: f64, y: f64) {
    core.touch_down(TouchDownEvent {
        time_ms: 0,
        id,
        position: Point::new(x, y),
    });
}

pub fn motion(core: &mut Core, id: i32, x: f64, y: f64) {
    core.touch_motion(TouchMotionEvent {
        time_ms: 0,
        id,
        position: Point::new(x, y),
    });
}

pub fn up(core: &mut Core, id: i32) {
    core.touch_up(TouchUpEvent { time_ms: 0, id });
}

pub fn key(core: &mut Core, key: u32, state: KeyState) {
    core.keyboard_key(KeyEvent { time_ms: 0, key, state });
}

pub fn button(core: &mut Core, button: u32, state: ButtonState) {
    core.pointer_button(PointerButtonEvent {
        time_ms: 0,
        button,
        state,
    });
}
