//! Key, button, touch and gesture bindings.
//!
//! A binding ties a trigger to a [`Callback`] and to the output that
//! registered it. A binding fires only while its output is the focused output.
//! Every binding gets a fresh [`BindingId`]; ids are never reused.

use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::callback::Callback;
use crate::context::Core;
use crate::input::gesture::{Gesture, GestureType};
use crate::types::{KeyEvent, Modifiers, OutputId, Point, PointerButtonEvent};

pub type KeyCallback = Callback<KeyEvent>;
pub type ButtonCallback = Callback<PointerButtonEvent>;
/// Called with the position of the first-index touch point.
pub type TouchCallback = Callback<Point>;
pub type GestureCallback = Callback<Gesture>;

/// Identifier of a registered binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

#[derive(Debug, Clone)]
enum BindingKind {
    Key {
        modifiers: Modifiers,
        key: u32,
        callback: KeyCallback,
    },
    Button {
        modifiers: Modifiers,
        button: u32,
        callback: ButtonCallback,
    },
    Touch {
        modifiers: Modifiers,
        callback: TouchCallback,
    },
    Gesture {
        kind: GestureType,
        finger_count: usize,
        callback: GestureCallback,
    },
}

impl BindingKind {
    fn callback_addr(&self) -> *const () {
        match self {
            BindingKind::Key { callback, .. } => callback.addr(),
            BindingKind::Button { callback, .. } => callback.addr(),
            BindingKind::Touch { callback, .. } => callback.addr(),
            BindingKind::Gesture { callback, .. } => callback.addr(),
        }
    }
}

#[derive(Debug, Clone)]
struct Binding {
    output: OutputId,
    kind: BindingKind,
}

/// All registered bindings, in registration order.
#[derive(Debug, Default)]
pub struct BindingRegistry {
    next_id: u64,
    bindings: BTreeMap<BindingId, Binding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, output: OutputId, kind: BindingKind) -> BindingId {
        let id = BindingId(self.next_id);
        self.next_id += 1;
        self.bindings.insert(id, Binding { output, kind });
        id
    }

    /// Binds `key` pressed with exactly `modifiers` held.
    pub fn add_key(&mut self, modifiers: Modifiers, key: u32, callback: KeyCallback, output: OutputId) -> BindingId {
        self.insert(
            output,
            BindingKind::Key {
                modifiers,
                key,
                callback,
            },
        )
    }

    pub fn add_button(
        &mut self,
        modifiers: Modifiers,
        button: u32,
        callback: ButtonCallback,
        output: OutputId,
    ) -> BindingId {
        self.insert(
            output,
            BindingKind::Button {
                modifiers,
                button,
                callback,
            },
        )
    }

    pub fn add_touch(&mut self, modifiers: Modifiers, callback: TouchCallback, output: OutputId) -> BindingId {
        self.insert(output, BindingKind::Touch { modifiers, callback })
    }

    /// Binds a gesture type and finger count. The direction of `gesture` is
    /// not part of the match; the callback receives the recognized gesture.
    pub fn add_gesture(&mut self, gesture: Gesture, callback: GestureCallback, output: OutputId) -> BindingId {
        self.insert(
            output,
            BindingKind::Gesture {
                kind: gesture.kind,
                finger_count: gesture.finger_count,
                callback,
            },
        )
    }

    /// Removes a binding by id. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: BindingId) -> bool {
        self.bindings.remove(&id).is_some()
    }

    /// Removes every binding, of any kind, that uses `callback`.
    /// Returns the number of bindings removed.
    pub fn remove_callback<E>(&mut self, callback: &Callback<E>) -> usize {
        let addr = callback.addr();
        let before = self.bindings.len();
        self.bindings.retain(|_, b| b.kind.callback_addr() != addr);
        before - self.bindings.len()
    }

    /// Removes every binding registered by `output`.
    pub fn remove_output(&mut self, output: OutputId) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|_, b| b.output != output);
        before - self.bindings.len()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn contains(&self, id: BindingId) -> bool {
        self.bindings.contains_key(&id)
    }

    fn on_output(&self, focused: OutputId) -> impl Iterator<Item = &BindingKind> {
        self.bindings
            .values()
            .filter(move |b| b.output == focused)
            .map(|b| &b.kind)
    }

    pub(crate) fn matching_keys(&self, modifiers: Modifiers, key: u32, focused: OutputId) -> Vec<KeyCallback> {
        self.on_output(focused)
            .filter_map(|kind| match kind {
                BindingKind::Key {
                    modifiers: m,
                    key: k,
                    callback,
                } if *m == modifiers && *k == key => Some(callback.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn matching_buttons(
        &self,
        modifiers: Modifiers,
        button: u32,
        focused: OutputId,
    ) -> Vec<ButtonCallback> {
        self.on_output(focused)
            .filter_map(|kind| match kind {
                BindingKind::Button {
                    modifiers: m,
                    button: b,
                    callback,
                } if *m == modifiers && *b == button => Some(callback.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn matching_touches(&self, modifiers: Modifiers, focused: OutputId) -> Vec<TouchCallback> {
        self.on_output(focused)
            .filter_map(|kind| match kind {
                BindingKind::Touch { modifiers: m, callback } if *m == modifiers => Some(callback.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn matching_gestures(&self, gesture: &Gesture, focused: OutputId) -> Vec<GestureCallback> {
        self.on_output(focused)
            .filter_map(|binding| match binding {
                BindingKind::Gesture {
                    kind,
                    finger_count,
                    callback,
                } if *kind == gesture.kind && *finger_count == gesture.finger_count => Some(callback.clone()),
                _ => None,
            })
            .collect()
    }
}

// Callbacks are collected before running so a callback may freely add or
// remove bindings.
impl Core {
    /// Runs the key bindings matching a press. Returns `true` if any fired.
    pub(crate) fn run_key_bindings(&mut self, event: &KeyEvent) -> bool {
        let Some(focused) = self.focused_output() else {
            return false;
        };
        let callbacks = self.bindings.matching_keys(self.modifiers.effective(), event.key, focused);
        for callback in &callbacks {
            callback.call(self, event);
        }
        if !callbacks.is_empty() {
            debug!(key = event.key, count = callbacks.len(), "Key bindings fired");
        }
        !callbacks.is_empty()
    }

    pub(crate) fn run_button_bindings(&mut self, event: &PointerButtonEvent) -> bool {
        let Some(focused) = self.focused_output() else {
            return false;
        };
        let callbacks = self.bindings.matching_buttons(self.modifiers.effective(), event.button, focused);
        for callback in &callbacks {
            callback.call(self, event);
        }
        if !callbacks.is_empty() {
            debug!(button = event.button, count = callbacks.len(), "Button bindings fired");
        }
        !callbacks.is_empty()
    }

    pub(crate) fn run_touch_bindings(&mut self, position: Point) -> bool {
        let Some(focused) = self.focused_output() else {
            return false;
        };
        let callbacks = self.bindings.matching_touches(self.modifiers.effective(), focused);
        for callback in &callbacks {
            callback.call(self, &position);
        }
        !callbacks.is_empty()
    }

    /// Runs the gesture bindings of the focused output.
    pub(crate) fn emit_gesture(&mut self, gesture: &Gesture) {
        debug!(?gesture, "Gesture recognized");
        let Some(focused) = self.focused_output() else {
            trace!("No focused output, gesture dropped");
            return;
        };
        let callbacks = self.bindings.matching_gestures(gesture, focused);
        for callback in &callbacks {
            callback.call(self, gesture);
        }
    }

    pub fn bindings(&self) -> &BindingRegistry {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut BindingRegistry {
        &mut self.bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::gesture::GestureDirection;
    use pretty_assertions::assert_eq;

    const OUT0: OutputId = OutputId(0);
    const OUT1: OutputId = OutputId(1);

    fn noop<E: 'static>() -> Callback<E> {
        Callback::new(|_, _| {})
    }

    #[test]
    fn test_ids_are_unique_and_removal_by_id() {
        let mut reg = BindingRegistry::new();
        let a = reg.add_key(Modifiers::SUPER, 30, noop(), OUT0);
        let b = reg.add_key(Modifiers::SUPER, 30, noop(), OUT0);
        assert_ne!(a, b);
        assert!(reg.remove(a));
        assert!(!reg.remove(a), "Removing twice reports absence.");
        assert!(reg.contains(b));
        let c = reg.add_touch(Modifiers::empty(), noop(), OUT0);
        assert_ne!(c, a, "Ids are never reused.");
    }

    #[test]
    fn test_remove_callback_removes_every_kind() {
        let mut reg = BindingRegistry::new();
        let shared: KeyCallback = noop();
        reg.add_key(Modifiers::ALT, 1, shared.clone(), OUT0);
        reg.add_key(Modifiers::ALT, 2, shared.clone(), OUT1);
        let other = reg.add_key(Modifiers::ALT, 3, noop(), OUT0);
        let gesture_cb: GestureCallback = noop();
        reg.add_gesture(
            Gesture::new(GestureType::Swipe, 3, GestureDirection::empty()),
            gesture_cb.clone(),
            OUT0,
        );

        assert_eq!(reg.remove_callback(&shared), 2);
        assert_eq!(reg.remove_callback(&gesture_cb), 1);
        assert_eq!(reg.len(), 1);
        assert!(reg.contains(other));
    }

    #[test]
    fn test_remove_output() {
        let mut reg = BindingRegistry::new();
        reg.add_button(Modifiers::SUPER, 0x110, noop(), OUT0);
        reg.add_touch(Modifiers::empty(), noop(), OUT0);
        let kept = reg.add_touch(Modifiers::empty(), noop(), OUT1);
        assert_eq!(reg.remove_output(OUT0), 2);
        assert!(reg.contains(kept));
        assert_eq!(reg.remove_output(OUT0), 0);
    }

    #[test]
    fn test_matching_respects_output_and_exact_modifiers() {
        let mut reg = BindingRegistry::new();
        reg.add_key(Modifiers::SUPER, 30, noop(), OUT0);
        reg.add_key(Modifiers::SUPER, 30, noop(), OUT1);
        reg.add_key(Modifiers::SUPER | Modifiers::SHIFT, 30, noop(), OUT0);

        assert_eq!(reg.matching_keys(Modifiers::SUPER, 30, OUT0).len(), 1);
        assert_eq!(reg.matching_keys(Modifiers::SUPER | Modifiers::SHIFT, 30, OUT0).len(), 1);
        assert_eq!(reg.matching_keys(Modifiers::empty(), 30, OUT0).len(), 0);
        assert_eq!(reg.matching_keys(Modifiers::SUPER, 31, OUT0).len(), 0);
    }

    #[test]
    fn test_gesture_matching_ignores_direction() {
        let mut reg = BindingRegistry::new();
        reg.add_gesture(
            Gesture::new(GestureType::Pinch, 4, GestureDirection::IN),
            noop(),
            OUT0,
        );
        let out = Gesture::new(GestureType::Pinch, 4, GestureDirection::OUT);
        let three = Gesture::new(GestureType::Pinch, 3, GestureDirection::OUT);
        let swipe = Gesture::new(GestureType::Swipe, 4, GestureDirection::LEFT);
        assert_eq!(reg.matching_gestures(&out, OUT0).len(), 1);
        assert_eq!(reg.matching_gestures(&three, OUT0).len(), 0);
        assert_eq!(reg.matching_gestures(&swipe, OUT0).len(), 0);
        assert_eq!(reg.matching_gestures(&out, OUT1).len(), 0);
    }
}
