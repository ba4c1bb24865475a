//! The compositor context.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use tracing::trace;

use crate::config::InputCoreConfig;
use crate::deferred::DeferredQueue;
use crate::input::bindings::BindingRegistry;
use crate::input::grab::{GrabProfile, GrabState};
use crate::input::seat::ClientSink;
use crate::input::session::SessionState;
use crate::input::touch::TouchRouter;
use crate::output::Output;
use crate::shell::{ShellClient, ShellClientId};
use crate::types::{ModifiersState, OutputId, Point};

/// Owns all input-routing state of the compositor.
///
/// There is exactly one `Core` per compositor instance. The host runtime
/// feeds it raw events (`pointer_*`, `keyboard_*`, `touch_*`), calls
/// [`Core::dispatch_idle`] once per event-loop turn, and reports session
/// changes with [`Core::toggle_session`]. Plugins receive `&mut Core` in
/// every callback.
pub struct Core {
    pub(crate) config: InputCoreConfig,
    pub(crate) sink: Box<dyn ClientSink>,
    pub(crate) outputs: BTreeMap<OutputId, Output>,
    pub(crate) focused_output: Option<OutputId>,
    pub(crate) bindings: BindingRegistry,
    pub(crate) grab: GrabState,
    pub(crate) session: SessionState,
    pub(crate) touch: TouchRouter,
    pub(crate) modifiers: ModifiersState,
    pub(crate) cursor: Point,
    /// Keys and buttons whose press fired a binding; their release is
    /// swallowed as well.
    pub(crate) consumed_keys: HashSet<u32>,
    pub(crate) consumed_buttons: HashSet<u32>,
    deferred: DeferredQueue,
    pub(crate) shell_clients: BTreeMap<ShellClientId, Box<dyn ShellClient>>,
    pub(crate) pending_shell_clients: BTreeMap<ShellClientId, Box<dyn ShellClient>>,
    pub(crate) next_shell_client: u64,
    pub(crate) woken: bool,
    pub(crate) plugin_profiles: HashMap<String, GrabProfile>,
}

impl Core {
    /// Creates the context. Client-bound input goes to `sink`.
    pub fn new(config: InputCoreConfig, sink: Box<dyn ClientSink>) -> Self {
        let touch = TouchRouter::new(config.gestures);
        Self {
            config,
            sink,
            outputs: BTreeMap::new(),
            focused_output: None,
            bindings: BindingRegistry::new(),
            grab: GrabState::default(),
            session: SessionState::default(),
            touch,
            modifiers: ModifiersState::default(),
            cursor: Point::default(),
            consumed_keys: HashSet::new(),
            consumed_buttons: HashSet::new(),
            deferred: DeferredQueue::default(),
            shell_clients: BTreeMap::new(),
            pending_shell_clients: BTreeMap::new(),
            next_shell_client: 0,
            woken: false,
            plugin_profiles: HashMap::new(),
        }
    }

    pub fn config(&self) -> &InputCoreConfig {
        &self.config
    }

    /// Queues `task` to run on the next [`Core::dispatch_idle`].
    pub fn defer<F>(&mut self, task: F)
    where
        F: FnOnce(&mut Core) + 'static,
    {
        self.deferred.push(Box::new(task));
    }

    /// Runs every deferred task, including tasks queued while dispatching.
    /// Returns the number of tasks run.
    pub fn dispatch_idle(&mut self) -> usize {
        let mut ran = 0;
        loop {
            let batch = self.deferred.take_all();
            if batch.is_empty() {
                break;
            }
            for task in batch {
                task(self);
                ran += 1;
            }
        }
        if ran > 0 {
            trace!(tasks = ran, "Deferred tasks dispatched");
        }
        ran
    }

    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }

    /// Ids of fingers currently on the surface.
    pub fn touch_points(&self) -> Vec<i32> {
        self.touch.fingers().map(|f| f.id).collect()
    }

    /// Whether a multi-finger gesture session is in progress.
    pub fn in_gesture(&self) -> bool {
        self.touch.in_gesture()
    }
}

impl fmt::Debug for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Core")
            .field("outputs", &self.outputs)
            .field("focused_output", &self.focused_output)
            .field("bindings", &self.bindings.len())
            .field("grab", &self.grab)
            .field("session", &self.session)
            .field("touch", &self.touch)
            .field("deferred", &self.deferred)
            .finish_non_exhaustive()
    }
}
