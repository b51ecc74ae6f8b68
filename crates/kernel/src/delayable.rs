//! Pairs a [`Timer`] with a [`Work`] item: on expiry, the item is submitted
//! to a designated queue instead of running directly on the timer's own
//! (interrupt) context.
//!
//! The timer's handler can't close over `&DelayableWork` directly — there
//! are no closures to speak of in a `'static`, no-alloc kernel object, and
//! even with closures we'd rather avoid a cyclic `Timer -> Work -> Timer`
//! back-reference. Instead we use the trampoline pattern from the design
//! notes: the timer stores a single opaque `context` pointer, and the
//! handler is a free function that casts it back to `&DelayableWork`.

use crate::timer::{self, Timer};
use crate::work::{self, Work, WorkQueue};
use core::cell::Cell;

pub struct DelayableWork {
    timer: Timer,
    work: Work,
    queue: Cell<Option<&'static WorkQueue>>,
}

unsafe impl Sync for DelayableWork {}

impl DelayableWork {
    pub const fn new(handler: work::Handler, context: *mut ()) -> Self {
        Self {
            timer: Timer::new(Self::on_expire, None, core::ptr::null_mut()),
            work: Work::new(handler, context),
            queue: Cell::new(None),
        }
    }

    /// Arms the timer; on expiry `self.work` is submitted to `queue`.
    pub fn schedule(&'static self, queue: &'static WorkQueue, delay_ms: u32) {
        self.queue.set(Some(queue));
        unsafe { self.timer.set_context(self as *const DelayableWork as *mut ()) };
        timer::start(&self.timer, delay_ms, 0);
    }

    /// Stops the timer and removes the work item if it is already pending.
    pub fn cancel(&'static self) {
        timer::stop(&self.timer);
        work::cancel(&self.work);
    }

    unsafe fn on_expire(ctx: *mut ()) {
        let this = &*(ctx as *const DelayableWork);
        if let Some(queue) = this.queue.get() {
            work::submit(queue, &this.work);
        }
    }
}
