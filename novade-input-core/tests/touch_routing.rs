mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use novade_input_core::{
    Abilities, Callback, ClientEvent, Core, Gesture, GestureDirection, GestureType, Modifiers,
    Point, TouchCallback,
};
use pretty_assertions::assert_eq;

fn record_gestures(core: &mut Core, kind: GestureType, fingers: usize) -> Rc<RefCell<Vec<Gesture>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    core.bindings_mut().add_gesture(
        Gesture::new(kind, fingers, GestureDirection::empty()),
        Callback::new(move |_: &mut Core, g: &Gesture| sink.borrow_mut().push(*g)),
        OUT0,
    );
    seen
}

#[test]
fn test_single_finger_is_delivered_to_client() {
    let (mut core, events) = core_with_output();
    down(&mut core, 0, 100.0, 100.0);
    motion(&mut core, 0, 120.0, 100.0);
    core.touch_frame();
    up(&mut core, 0);
    core.touch_frame();
    core.touch_frame();

    assert_eq!(
        take(&events),
        vec![
            ClientEvent::TouchDown { time_ms: 0, id: 0, position: Point::new(100.0, 100.0) },
            ClientEvent::TouchMotion { time_ms: 0, id: 0, position: Point::new(120.0, 100.0) },
            ClientEvent::TouchFrame,
            ClientEvent::TouchUp { time_ms: 0, id: 0 },
            ClientEvent::TouchFrame,
        ]
    );
    assert!(core.touch_points().is_empty());
}

#[test]
fn test_third_finger_takes_touches_from_client() {
    let (mut core, events) = core_with_output();
    down(&mut core, 0, 800.0, 500.0);
    down(&mut core, 1, 900.0, 500.0);
    take(&events);

    down(&mut core, 2, 1000.0, 500.0);
    assert!(core.in_gesture());
    assert_eq!(
        take(&events),
        vec![
            ClientEvent::TouchUp { time_ms: 0, id: 0 },
            ClientEvent::TouchUp { time_ms: 0, id: 1 },
        ],
        "Held fingers get an up and the third finger is never delivered."
    );

    motion(&mut core, 0, 850.0, 500.0);
    up(&mut core, 2);
    up(&mut core, 1);
    up(&mut core, 0);
    assert!(take(&events).is_empty(), "Nothing of the gesture reaches the client.");
    assert!(!core.in_gesture());
}

#[test]
fn test_swipe_fires_gesture_binding_once() {
    let (mut core, events) = core_with_output();
    let seen = record_gestures(&mut core, GestureType::Swipe, 3);

    for id in 0..3 {
        down(&mut core, id, 800.0 + 100.0 * f64::from(id), 500.0);
    }
    for step in 1..=4 {
        for id in 0..3 {
            motion(&mut core, id, 800.0 + 100.0 * f64::from(id) - 60.0 * f64::from(step), 500.0);
        }
    }

    assert_eq!(
        *seen.borrow(),
        vec![Gesture::new(GestureType::Swipe, 3, GestureDirection::LEFT)]
    );
    assert!(take(&events).is_empty());
}

#[test]
fn test_edge_swipe_from_bottom() {
    let (mut core, _events) = core_with_output();
    let edge = record_gestures(&mut core, GestureType::EdgeSwipe, 3);
    let plain = record_gestures(&mut core, GestureType::Swipe, 3);

    for id in 0..3 {
        down(&mut core, id, 800.0 + 100.0 * f64::from(id), 1060.0);
    }
    for id in 0..3 {
        motion(&mut core, id, 800.0 + 100.0 * f64::from(id), 900.0);
    }

    assert_eq!(
        *edge.borrow(),
        vec![Gesture::new(GestureType::EdgeSwipe, 3, GestureDirection::UP)]
    );
    assert!(plain.borrow().is_empty());
}

#[test]
fn test_edge_swipe_from_top() {
    let (mut core, events) = core_with_output();
    let edge = record_gestures(&mut core, GestureType::EdgeSwipe, 3);

    for id in 0..3 {
        down(&mut core, id, 800.0 + 100.0 * f64::from(id), 20.0);
    }
    for step in 1..=7 {
        for id in 0..3 {
            motion(&mut core, id, 800.0 + 100.0 * f64::from(id), 20.0 + 20.0 * f64::from(step));
        }
    }

    assert_eq!(
        *edge.borrow(),
        vec![Gesture::new(GestureType::EdgeSwipe, 3, GestureDirection::DOWN)]
    );
    assert!(take(&events).is_empty());
}

#[test]
fn test_pinch_with_four_fingers() {
    let (mut core, _events) = core_with_output();
    let three = record_gestures(&mut core, GestureType::Pinch, 3);
    let four = record_gestures(&mut core, GestureType::Pinch, 4);

    let wide = [(700.0, 300.0), (1100.0, 300.0), (1100.0, 700.0), (700.0, 700.0)];
    for (id, &(x, y)) in wide.iter().enumerate() {
        down(&mut core, id as i32, x, y);
    }
    for (id, &(x, y)) in wide.iter().enumerate() {
        // Halfway toward the center (900, 500).
        motion(&mut core, id as i32, (x + 900.0) / 2.0, (y + 500.0) / 2.0);
    }

    assert!(three.borrow().is_empty(), "Finger count is part of the match.");
    assert_eq!(
        *four.borrow(),
        vec![Gesture::new(GestureType::Pinch, 4, GestureDirection::IN)]
    );
}

#[test]
fn test_touch_binding_starting_grab_delivers_one_down_to_grab() {
    let (mut core, events) = core_with_output();
    let (iface, grab) = iface("overview", Abilities::GRAB_INPUT);
    core.activate_plugin(&iface, false).unwrap();

    let target = Rc::clone(&iface);
    let callback: TouchCallback = Callback::new(move |core: &mut Core, _pos: &Point| {
        core.grab(&target).unwrap();
    });
    core.bindings_mut().add_touch(Modifiers::empty(), callback, OUT0);

    down(&mut core, 0, 50.0, 60.0);

    assert_eq!(
        grab.take(),
        vec![GrabEvent::TouchDown(0, Point::new(50.0, 60.0))],
        "Exactly one down reaches the grab."
    );
    assert_eq!(take(&events), vec![ClientEvent::PointerFocusCleared]);

    up(&mut core, 0);
    assert_eq!(grab.take(), vec![GrabEvent::TouchUp(0)]);
}

#[test]
fn test_touch_bindings_only_match_first_index_finger() {
    let (mut core, events) = core_with_output();
    let hits = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&hits);
    core.bindings_mut().add_touch(
        Modifiers::empty(),
        Callback::new(move |_: &mut Core, _: &Point| *counter.borrow_mut() += 1),
        OUT0,
    );

    down(&mut core, 1, 10.0, 10.0);
    assert_eq!(*hits.borrow(), 0);
    down(&mut core, 0, 20.0, 20.0);
    assert_eq!(*hits.borrow(), 1);
    assert_eq!(take(&events).len(), 2, "Touch bindings do not consume the touch.");
}

#[test]
fn test_grab_takes_over_client_fingers_and_new_fingers() {
    let (mut core, events) = core_with_output();
    down(&mut core, 0, 10.0, 10.0);
    take(&events);

    let (iface, grab) = grabbed(&mut core, "move");
    assert_eq!(
        take(&events),
        vec![
            ClientEvent::PointerFocusCleared,
            ClientEvent::TouchUp { time_ms: 0, id: 0 },
        ]
    );
    assert_eq!(grab.take(), vec![GrabEvent::TouchDown(0, Point::new(10.0, 10.0))]);

    down(&mut core, 1, 30.0, 30.0);
    motion(&mut core, 1, 35.0, 30.0);
    core.touch_frame();
    assert_eq!(
        grab.take(),
        vec![
            GrabEvent::TouchDown(1, Point::new(30.0, 30.0)),
            GrabEvent::TouchMotion(1, Point::new(35.0, 30.0)),
            GrabEvent::TouchFrame,
        ]
    );

    core.ungrab(&iface);
    take(&events);
    down(&mut core, 2, 50.0, 50.0);
    up(&mut core, 0);
    assert_eq!(
        take(&events),
        vec![ClientEvent::TouchDown { time_ms: 0, id: 2, position: Point::new(50.0, 50.0) }],
        "New fingers go back to clients; the up of a grab finger goes nowhere."
    );
    assert!(grab.take().is_empty());
}

#[test]
fn test_touch_is_dropped_while_session_inactive() {
    let (mut core, events) = core_with_output();
    core.toggle_session();
    down(&mut core, 0, 10.0, 10.0);
    assert!(core.touch_points().is_empty());
    assert!(take(&events).is_empty());
}

#[test]
fn test_session_loss_cancels_fingers_and_frees_their_ids() {
    let (mut core, events) = core_with_output();
    down(&mut core, 0, 10.0, 10.0);
    take(&events);

    core.toggle_session();
    assert_eq!(take(&events), vec![ClientEvent::TouchCancel]);
    assert!(core.touch_points().is_empty());

    motion(&mut core, 0, 15.0, 10.0);
    up(&mut core, 0);
    assert!(take(&events).is_empty());

    core.toggle_session();
    down(&mut core, 0, 30.0, 30.0);
    assert_eq!(
        take(&events),
        vec![ClientEvent::TouchDown { time_ms: 0, id: 0, position: Point::new(30.0, 30.0) }]
    );
    assert_eq!(core.touch_points(), vec![0]);
}

#[test]
fn test_session_loss_sends_ups_to_grab_fingers() {
    let (mut core, events) = core_with_output();
    let (iface, grab) = grabbed(&mut core, "move");
    down(&mut core, 0, 10.0, 10.0);
    grab.take();
    take(&events);

    core.toggle_session();
    assert_eq!(grab.take(), vec![GrabEvent::TouchUp(0)]);
    assert!(
        !take(&events).contains(&ClientEvent::TouchCancel),
        "The client held no fingers."
    );

    core.toggle_session();
    assert!(Rc::ptr_eq(&core.active_grab().unwrap(), &iface));
    down(&mut core, 0, 20.0, 20.0);
    assert_eq!(grab.take(), vec![GrabEvent::TouchDown(0, Point::new(20.0, 20.0))]);
}

#[test]
fn test_touch_cancel() {
    let (mut core, events) = core_with_output();
    down(&mut core, 0, 10.0, 10.0);
    down(&mut core, 1, 20.0, 10.0);
    take(&events);
    core.touch_cancel();
    assert_eq!(take(&events), vec![ClientEvent::TouchCancel]);
    assert!(core.touch_points().is_empty());

    core.touch_frame();
    assert!(take(&events).is_empty(), "Cancel clears the pending frame.");
}

#[test]
fn test_gesture_binding_of_unfocused_output_does_not_fire() {
    let (mut core, _events) = core_with_output();
    core.add_output(OUT1, novade_input_core::Geometry::new(1920, 0, 1920, 1080), Vec::new())
        .unwrap();
    let seen = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&seen);
    core.bindings_mut().add_gesture(
        Gesture::new(GestureType::Swipe, 3, GestureDirection::empty()),
        Callback::new(move |_: &mut Core, _: &Gesture| *counter.borrow_mut() += 1),
        OUT1,
    );

    for id in 0..3 {
        down(&mut core, id, 800.0 + 100.0 * f64::from(id), 500.0);
    }
    for id in 0..3 {
        motion(&mut core, id, 1000.0 + 100.0 * f64::from(id), 500.0);
    }
    assert_eq!(*seen.borrow(), 0);
}
