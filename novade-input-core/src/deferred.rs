use std::collections::VecDeque;
use std::fmt;

use crate::context::Core;

pub(crate) type DeferredTask = Box<dyn FnOnce(&mut Core)>;

/// FIFO of work postponed to the next event-loop turn.
#[derive(Default)]
pub(crate) struct DeferredQueue {
    tasks: VecDeque<DeferredTask>,
}

impl DeferredQueue {
    pub(crate) fn push(&mut self, task: DeferredTask) {
        self.tasks.push_back(task);
    }

    /// Takes every queued task, leaving the queue empty.
    pub(crate) fn take_all(&mut self) -> VecDeque<DeferredTask> {
        std::mem::take(&mut self.tasks)
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }
}

impl fmt::Debug for DeferredQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredQueue").field("pending", &self.tasks.len()).finish()
    }
}
