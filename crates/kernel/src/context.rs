//! Identity token the imported host uses to answer "am I the work-queue
//! thread?" without there being a real thread to ask.
//!
//! The Zephyr-derived host often short-circuits to a synchronous call path
//! when it believes it is already running on its own worker thread, and
//! queues work otherwise. [`current_context`] gives the same answer by
//! tracking, per invocation of [`crate::work::process`], whether a handler
//! is currently executing.

use core::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Context {
    /// Running inside a transport interrupt handler.
    Isr,
    /// Running inside a work-item handler dispatched by `work::process`.
    WorkQueue,
    /// Anywhere else (the main pump, `sem::take`'s own loop body, etc).
    Main,
}

struct Flag(Cell<bool>);
unsafe impl Sync for Flag {}

static IN_WORK_QUEUE: Flag = Flag(Cell::new(false));

pub fn current_context() -> Context {
    if crate::misc::is_in_isr() {
        Context::Isr
    } else if IN_WORK_QUEUE.0.get() {
        Context::WorkQueue
    } else {
        Context::Main
    }
}

/// RAII guard toggled around each work-item handler invocation.
pub(crate) struct WorkQueueGuard(bool);

impl WorkQueueGuard {
    pub(crate) fn enter() -> Self {
        let was = IN_WORK_QUEUE.0.replace(true);
        Self(was)
    }
}

impl Drop for WorkQueueGuard {
    fn drop(&mut self) {
        IN_WORK_QUEUE.0.set(self.0);
    }
}
