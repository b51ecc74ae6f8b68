//! Single-shot work items dispatched to completion by a bounded,
//! re-entrancy-guarded loop.
//!
//! Two queues are predefined: [`SYSTEM_QUEUE`], which carries all
//! host-submitted work, and [`INIT_QUEUE`], reserved for early boot work and
//! excluded from [`process`] — see `hci_adapter::pump`'s module docs for why
//! init work must not be pumped synchronously from `enable()`.

use crate::context::WorkQueueGuard;
use crate::fifo::{Link, Linked, List};
use core::cell::Cell;

pub type Handler = unsafe fn(*mut ());

pub struct Work {
    link: Link<Work>,
    pending: Cell<bool>,
    owner: Cell<Option<&'static WorkQueue>>,
    handler: Handler,
    context: Cell<*mut ()>,
}

unsafe impl Sync for Work {}

unsafe impl Linked for Work {
    fn link(&self) -> &Link<Work> {
        &self.link
    }
}

impl Work {
    pub const fn new(handler: Handler, context: *mut ()) -> Self {
        Self {
            link: Link::new(),
            pending: Cell::new(false),
            owner: Cell::new(None),
            handler,
            context: Cell::new(context),
        }
    }

    /// # Safety
    /// Must not be called while the item is pending.
    pub unsafe fn set_context(&self, context: *mut ()) {
        self.context.set(context);
    }

    pub fn is_pending(&self) -> bool {
        critical_section::with(|_| self.pending.get())
    }
}

pub struct WorkQueue {
    name: &'static str,
    items: List<Work>,
    reserved: bool,
}

unsafe impl Sync for WorkQueue {}

impl WorkQueue {
    pub const fn new(name: &'static str) -> Self {
        Self { name, items: List::new(), reserved: false }
    }

    const fn reserved_queue(name: &'static str) -> Self {
        Self { name, items: List::new(), reserved: true }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// All host-submitted work lands here.
pub static SYSTEM_QUEUE: WorkQueue = WorkQueue::new("sys_workq");

/// Reserved for early-boot work. Never drained by [`process`]; a port that
/// wants synchronous init processing must drain it explicitly from its own
/// wait loop instead.
pub static INIT_QUEUE: WorkQueue = WorkQueue::reserved_queue("init_workq");

const MAX_QUEUES: usize = 4;

struct Registry {
    queues: Cell<[Option<&'static WorkQueue>; MAX_QUEUES]>,
    len: Cell<usize>,
}
unsafe impl Sync for Registry {}

static REGISTRY: Registry = Registry { queues: Cell::new([None; MAX_QUEUES]), len: Cell::new(0) };

/// Registers a work queue in the global list walked by [`process`].
/// Idempotent only in the sense that calling it twice for the same queue
/// wastes a registry slot — callers should register each queue exactly once
/// at boot.
pub fn init(queue: &'static WorkQueue) {
    critical_section::with(|_| {
        let mut arr = REGISTRY.queues.get();
        let len = REGISTRY.len.get();
        assert!(len < MAX_QUEUES, "too many work queues registered");
        arr[len] = Some(queue);
        REGISTRY.queues.set(arr);
        REGISTRY.len.set(len + 1);
    });
}

/// Registers [`SYSTEM_QUEUE`] and [`INIT_QUEUE`]. Call once at boot before
/// any `submit`.
pub fn init_default_queues() {
    init(&SYSTEM_QUEUE);
    init(&INIT_QUEUE);
}

struct NotifyHook(Cell<Option<fn()>>);
unsafe impl Sync for NotifyHook {}
static NOTIFY_HOOK: NotifyHook = NotifyHook(Cell::new(None));

/// Installs the scheduling hook callback invoked after every new
/// submission (ignored on duplicate submissions). `hci_adapter::pump` wires
/// this to its coalescing "pump requested" flag.
pub fn set_notify_hook(hook: fn()) {
    critical_section::with(|_| NOTIFY_HOOK.0.set(Some(hook)));
}

/// Submits `work` to `queue`. Returns `1` on a new submission, `0` if the
/// item was already pending (duplicate submissions while pending are a
/// no-op, per the work-idempotence invariant).
pub fn submit(queue: &'static WorkQueue, work: &'static Work) -> i32 {
    let newly_submitted = critical_section::with(|_| {
        if work.pending.get() {
            false
        } else {
            work.pending.set(true);
            work.owner.set(Some(queue));
            queue.items.push_back(work);
            true
        }
    });

    if newly_submitted {
        if let Some(hook) = NOTIFY_HOOK.0.get() {
            hook();
        }
        1
    } else {
        0
    }
}

/// Removes `work` from its queue if pending. No-op otherwise.
pub fn cancel(work: &'static Work) {
    critical_section::with(|_| {
        if let Some(queue) = work.owner.get() {
            queue.items.remove(work);
            work.pending.set(false);
            work.owner.set(None);
        }
    });
}

struct Running(Cell<bool>);
unsafe impl Sync for Running {}
static RUNNING: Running = Running(Cell::new(false));

struct WaitDepth(Cell<u8>);
unsafe impl Sync for WaitDepth {}
static WAIT_DEPTH: WaitDepth = WaitDepth(Cell::new(0));

const MAX_ITEMS_PER_QUEUE_PER_PUMP: u32 = 100;

fn run_all_queues() {
    let queues = REGISTRY.queues.get();
    let len = REGISTRY.len.get();
    for slot in queues.iter().take(len) {
        let Some(queue) = slot else { continue };
        if queue.reserved {
            continue;
        }
        let mut processed = 0;
        while processed < MAX_ITEMS_PER_QUEUE_PER_PUMP {
            let Some(work) = critical_section::with(|_| {
                let popped = queue.items.pop_front();
                if let Some(w) = popped {
                    w.pending.set(false);
                    w.owner.set(None);
                }
                popped
            }) else {
                break;
            };
            let _ctx = WorkQueueGuard::enter();
            unsafe { (work.handler)(work.context.get()) };
            processed += 1;
        }
    }
}

/// The dispatcher's periodic-pump entry point. Rejects nested calls — the
/// only legitimate nesting is through [`process_from_wait`], driven by a
/// handler's `sem::take`.
pub fn process() {
    if RUNNING.0.get() {
        return;
    }
    RUNNING.0.set(true);
    run_all_queues();
    RUNNING.0.set(false);
}

/// Called by `sem::take`'s wait loop. Allows exactly one level of nested
/// dispatch (depth 1); a second attempt to nest (depth >= 2) is refused, to
/// bound blocking from stale post-disconnect handlers. Returns whether the
/// dispatch actually ran.
///
/// Restores `RUNNING` to whatever it was before this call rather than
/// unconditionally clearing it: when this nested call runs from inside a
/// handler that an outer `process()` is still dispatching, `RUNNING` must
/// stay `true` for the rest of that outer pump once this returns, so a
/// later handler in the same pump that re-enters `process()` is still
/// rejected.
pub(crate) fn process_from_wait() -> bool {
    if WAIT_DEPTH.0.get() >= 1 {
        return false;
    }
    WAIT_DEPTH.0.set(1);
    let was_running = RUNNING.0.get();
    RUNNING.0.set(true);
    run_all_queues();
    RUNNING.0.set(was_running);
    WAIT_DEPTH.0.set(0);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    // Tests share process-wide statics (`SYSTEM_QUEUE`, `REGISTRY`, ...), so
    // run them single-threaded and reset the bits each test touches.
    fn reset() {
        RUNNING.0.set(false);
        WAIT_DEPTH.0.set(0);
        while SYSTEM_QUEUE.items.pop_front().is_some() {}
    }

    fn ensure_registered() {
        let len = REGISTRY.len.get();
        let already = REGISTRY.queues.get().iter().take(len).any(|q| matches!(q, Some(q) if core::ptr::eq(*q, &SYSTEM_QUEUE)));
        if !already {
            init(&SYSTEM_QUEUE);
        }
    }

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    unsafe fn incrementing_handler(_ctx: *mut ()) {
        COUNTER.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn resubmitting_a_pending_item_is_a_no_op() {
        reset();
        ensure_registered();
        static W: Work = Work::new(incrementing_handler, core::ptr::null_mut());
        assert_eq!(submit(&SYSTEM_QUEUE, &W), 1);
        assert_eq!(submit(&SYSTEM_QUEUE, &W), 0); // still pending: duplicate
        assert!(W.is_pending());
        cancel(&W);
        assert!(!W.is_pending());
    }

    #[test]
    fn process_runs_a_submitted_item_exactly_once_and_clears_pending_before_the_handler_runs() {
        reset();
        ensure_registered();
        COUNTER.store(0, Ordering::SeqCst);

        static PENDING_DURING_RUN: AtomicU32 = AtomicU32::new(2);
        static W: Work = Work::new(check_pending_cleared, core::ptr::null_mut());
        unsafe fn check_pending_cleared(_ctx: *mut ()) {
            // The dispatcher must clear `pending` before invoking the
            // handler, not after.
            PENDING_DURING_RUN.store(0, Ordering::SeqCst);
            COUNTER.fetch_add(1, Ordering::SeqCst);
        }

        submit(&SYSTEM_QUEUE, &W);
        assert!(W.is_pending());
        process();
        assert!(!W.is_pending());
        assert_eq!(COUNTER.load(Ordering::SeqCst), 1);
        assert_eq!(PENDING_DURING_RUN.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn a_handler_resubmitting_itself_runs_again_only_on_the_next_pump() {
        reset();
        ensure_registered();
        COUNTER.store(0, Ordering::SeqCst);

        static SELF: Work = Work::new(resubmit_self, core::ptr::null_mut());
        unsafe fn resubmit_self(_ctx: *mut ()) {
            COUNTER.fetch_add(1, Ordering::SeqCst);
            submit(&SYSTEM_QUEUE, &SELF);
        }

        submit(&SYSTEM_QUEUE, &SELF);
        process();
        // Re-submission during the handler must not be picked up by this
        // same `process()` call.
        assert_eq!(COUNTER.load(Ordering::SeqCst), 1);
        assert!(SELF.is_pending());

        process();
        assert_eq!(COUNTER.load(Ordering::SeqCst), 2);

        cancel(&SELF);
    }

    #[test]
    fn nested_dispatch_is_allowed_exactly_one_level_deep() {
        reset();
        assert!(process_from_wait());
        // Depth is restored to 0 on exit, so a second top-level call
        // succeeds again...
        assert!(process_from_wait());
    }

    #[test]
    fn process_from_wait_restores_running_instead_of_clearing_it() {
        reset();
        ensure_registered();

        // Simulates being called from inside an outer `process()` that is
        // still on the stack above this nested wait-driven dispatch.
        RUNNING.0.set(true);
        assert!(process_from_wait());
        // Must come back exactly as found: still running, not cleared.
        assert!(RUNNING.0.get());

        COUNTER.store(0, Ordering::SeqCst);
        static W: Work = Work::new(incrementing_handler, core::ptr::null_mut());
        submit(&SYSTEM_QUEUE, &W);
        // With RUNNING still (correctly) true, this reentrant top-level call
        // must be rejected rather than silently dispatching W.
        process();
        assert_eq!(COUNTER.load(Ordering::SeqCst), 0);

        cancel(&W);
        RUNNING.0.set(false);
    }

    #[test]
    fn process_rejects_reentrant_calls_from_within_a_handler() {
        reset();
        ensure_registered();

        static REENTRANT_RESULT: AtomicU32 = AtomicU32::new(9);
        static W: Work = Work::new(call_process_reentrantly, core::ptr::null_mut());
        unsafe fn call_process_reentrantly(_ctx: *mut ()) {
            // `RUNNING` is already true here; a nested `process()` must
            // refuse rather than recurse.
            let before = RUNNING.0.get();
            process();
            REENTRANT_RESULT.store(if before { 1 } else { 0 }, Ordering::SeqCst);
        }

        submit(&SYSTEM_QUEUE, &W);
        process();
        assert_eq!(REENTRANT_RESULT.load(Ordering::SeqCst), 1);
    }
}
