//! Shared, identity-comparable callbacks.
//!
//! Bindings and signal handlers are registered as [`Callback`]s. The same
//! callback value may be registered under several triggers, and
//! [`crate::BindingRegistry::remove_callback`] later removes every binding
//! that uses it, so callbacks are compared by the address of their shared
//! allocation instead of by value.

use std::fmt;
use std::rc::Rc;

use crate::context::Core;

/// A callback invoked with the core context and an event of type `E`.
pub struct Callback<E> {
    inner: Rc<dyn Fn(&mut Core, &E)>,
}

impl<E> Callback<E> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&mut Core, &E) + 'static,
    {
        Self { inner: Rc::new(f) }
    }

    pub fn call(&self, core: &mut Core, event: &E) {
        (self.inner)(core, event)
    }

    /// Address of the shared allocation, used as the callback's identity.
    pub fn addr(&self) -> *const () {
        Rc::as_ptr(&self.inner) as *const ()
    }

    /// `true` if both handles refer to the same registered closure.
    pub fn same_as<T>(&self, other: &Callback<T>) -> bool {
        self.addr() == other.addr()
    }
}

impl<E> Clone for Callback<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for Callback<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback").field(&self.addr()).finish()
    }
}
