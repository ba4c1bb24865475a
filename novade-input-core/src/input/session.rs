//! Session (VT) activity.
//!
//! While the compositor does not own the display hardware (another VT is in
//! the foreground, the seat was taken away by the session manager) no input
//! is routed anywhere. The active grab is stashed when the session goes
//! inactive and re-installed when it comes back.

use std::rc::{Rc, Weak};
use tracing::{info, warn};

use crate::context::Core;
use crate::input::grab::GrabInterface;

#[derive(Debug)]
pub(crate) struct SessionState {
    pub(crate) active: bool,
    suspended_grab: Option<Weak<GrabInterface>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            active: true,
            suspended_grab: None,
        }
    }
}

impl Core {
    pub fn session_active(&self) -> bool {
        self.session.active
    }

    /// Flips session activity.
    ///
    /// Going inactive cancels every touch sequence, then releases the active
    /// grab and remembers it. Coming back re-grabs the remembered interface if
    /// its owner still wants the grab.
    pub fn toggle_session(&mut self) {
        self.session.active = !self.session.active;
        if !self.session.active {
            // Grab fingers need their ups while the grab is still installed.
            self.touch_cancel();
            if let Some(iface) = self.live_grab() {
                self.ungrab_input();
                self.session.suspended_grab = Some(Rc::downgrade(&iface));
            }
            info!("Session deactivated, input suspended");
            return;
        }

        info!("Session activated, input resumed");
        let Some(iface) = self.session.suspended_grab.take().and_then(|w| w.upgrade()) else {
            return;
        };
        if let Err(e) = self.grab_input(&iface) {
            warn!(plugin = %iface.name(), "Could not restore grab after session resume: {}", e);
        }
    }

    /// Sets session activity, toggling only on an actual change.
    pub fn set_session_active(&mut self, active: bool) {
        if self.session.active != active {
            self.toggle_session();
        }
    }

    /// Drops `iface` from the suspended slot once its owner gave up the grab.
    pub(crate) fn forget_suspended_grab(&mut self, iface: &Rc<GrabInterface>) {
        let is_suspended = self
            .session
            .suspended_grab
            .as_ref()
            .is_some_and(|weak| std::ptr::eq(weak.as_ptr(), Rc::as_ptr(iface)));
        if is_suspended {
            self.session.suspended_grab = None;
        }
    }
}
