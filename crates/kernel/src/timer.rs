//! One-shot / periodic timers driven by [`crate::misc::tick`].
//!
//! A timer is armed iff it is linked onto the global active-timer set;
//! [`process`] is the tick hook that fires everything whose expiry has
//! passed and reschedules periodic timers. If the host is too slow to call
//! `process` promptly, missed periods are dropped rather than coalesced:
//! a periodic timer's next expiry is always `now + period`, never
//! `old_expiry + period`.

use crate::fifo::{Link, Linked, List};
use crate::misc;
use crate::time::{before, Timepoint};
use core::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Armed,
}

/// A timer handler. Receives the opaque context pointer installed at
/// construction time; see the module docs on the trampoline pattern used by
/// [`crate::delayable::DelayableWork`] for why this is a raw `fn` rather
/// than a closure.
pub type Handler = unsafe fn(*mut ());

pub struct Timer {
    link: Link<Timer>,
    state: Cell<State>,
    expiry: Cell<Timepoint>,
    period: Cell<u32>,
    handler: Handler,
    stop_fn: Option<Handler>,
    context: Cell<*mut ()>,
}

// All field mutation happens inside a critical section (via the intrusive
// list's internal locking, or explicitly below); the raw context pointer is
// the caller's responsibility, matching the teacher's existing raw-pointer
// static tables.
unsafe impl Sync for Timer {}

unsafe impl Linked for Timer {
    fn link(&self) -> &Link<Timer> {
        &self.link
    }
}

impl Timer {
    pub const fn new(handler: Handler, stop_fn: Option<Handler>, context: *mut ()) -> Self {
        Self {
            link: Link::new(),
            state: Cell::new(State::Idle),
            expiry: Cell::new(0),
            period: Cell::new(0),
            handler,
            stop_fn,
            context: Cell::new(context),
        }
    }

    /// Re-targets the opaque context pointer. Needed by [`crate::delayable`]
    /// which cannot know its own `'static` address until after construction.
    ///
    /// # Safety
    /// Must not be called while the timer is armed.
    pub unsafe fn set_context(&self, context: *mut ()) {
        self.context.set(context);
    }
}

static ACTIVE_TIMERS: List<Timer> = List::new();

/// Arms `timer` to fire `duration_ms` from now. `duration_ms == 0` fires on
/// the next call to [`process`]. `period_ms != 0` rearms automatically after
/// firing.
pub fn start(timer: &'static Timer, duration_ms: u32, period_ms: u32) {
    critical_section::with(|_| {
        timer.expiry.set(misc::uptime().wrapping_add(duration_ms));
        timer.period.set(period_ms);
        if timer.state.get() != State::Armed {
            timer.state.set(State::Armed);
            ACTIVE_TIMERS.push_back(timer);
        }
    });
}

/// Removes `timer` from the active set. Safe to call on an idle timer.
pub fn stop(timer: &'static Timer) {
    critical_section::with(|_| {
        if timer.state.get() == State::Armed {
            ACTIVE_TIMERS.remove(timer);
            timer.state.set(State::Idle);
            if let Some(stop_fn) = timer.stop_fn {
                unsafe { stop_fn(timer.context.get()) };
            }
        }
    });
}

/// Ticks until expiry, or 0 if idle or already expired.
pub fn remaining(timer: &'static Timer) -> u32 {
    if timer.state.get() != State::Armed {
        return 0;
    }
    let now = misc::uptime();
    let expiry = timer.expiry.get();
    if before(now, expiry) {
        expiry.wrapping_sub(now)
    } else {
        0
    }
}

/// Fires every armed timer whose expiry has passed, then rearms the
/// periodic ones. Intended to be called from the scheduling hook in
/// `hci_adapter::pump`, never directly from inside a timer handler.
pub fn process() {
    let now = misc::uptime();
    // Two-pass: pop everything off the shared list first (so a handler that
    // calls `start`/`stop` on *other* timers can't race this walk), then
    // splice the still-pending ones back on at the end.
    let pending: List<Timer> = List::new();

    loop {
        let Some(timer) = ACTIVE_TIMERS.pop_front() else { break };
        if !before(now, timer.expiry.get()) {
            let period = timer.period.get();
            if period == 0 {
                timer.state.set(State::Idle);
            } else {
                timer.expiry.set(now.wrapping_add(period));
            }
            unsafe { (timer.handler)(timer.context.get()) };
            if period != 0 && timer.state.get() == State::Armed {
                pending.push_back(timer);
            }
        } else {
            pending.push_back(timer);
        }
    }

    while let Some(timer) = pending.pop_front() {
        ACTIVE_TIMERS.push_back(timer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    static FIRED: AtomicU32 = AtomicU32::new(0);

    unsafe fn count_fire(_ctx: *mut ()) {
        FIRED.fetch_add(1, Ordering::SeqCst);
    }

    static ONE_SHOT: Timer = Timer::new(count_fire, None, core::ptr::null_mut());

    #[test]
    fn one_shot_expires_after_its_duration_and_stays_idle() {
        FIRED.store(0, Ordering::SeqCst);
        start(&ONE_SHOT, 10, 0);
        assert_eq!(remaining(&ONE_SHOT), 10);

        misc::tick(10);
        process();

        assert_eq!(FIRED.load(Ordering::SeqCst), 1);
        assert_eq!(remaining(&ONE_SHOT), 0);

        // A second tick with nothing re-armed must not fire again.
        misc::tick(10);
        process();
        assert_eq!(FIRED.load(Ordering::SeqCst), 1);
    }
}
