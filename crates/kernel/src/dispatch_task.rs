//! Optional high-priority dispatch task for ports with a lightweight task
//! abstraction: instead of waiting for the periodic soft timer in
//! `hci_adapter::pump`, a dedicated task blocks on a counting signal and
//! runs the work dispatcher the instant something submits.
//!
//! Generalises the teacher's IPCC-interrupt -> `embassy_sync::signal::Signal`
//! -> task-wakeup pattern (`ble.rs`'s `STATE.rx_int`/`tx_int`, woken from
//! `handle_ipcc_rx`/`handle_ipcc_tx` and awaited by an async task) off the
//! embassy-specific `Signal` and onto this crate's own [`crate::sem::Semaphore`],
//! so the same pump-while-waiting primitive that backs `Semaphore::take`
//! also drives this task without pulling an async runtime into this crate.
//! A port that wants this simply loops `run_once` in its own task; a port
//! without one relies solely on the soft-timer pump.

use crate::sem::Semaphore;
use crate::time::Timeout;
use crate::work;
use core::cell::Cell;

pub struct DispatchTask {
    signal: Semaphore,
    suspended: Cell<u32>,
}

unsafe impl Sync for DispatchTask {}

impl DispatchTask {
    pub const fn new() -> Self {
        Self { signal: Semaphore::new(0, 1), suspended: Cell::new(0) }
    }

    /// Raises the signal. ISR-safe: call this from `work::set_notify_hook`
    /// (or directly from an interrupt handler) instead of doing any
    /// dispatch work in that context.
    pub fn notify(&self) {
        self.signal.give();
    }

    /// Suspends dispatch. Nests: the task keeps consuming signals (so none
    /// pile up past the semaphore's limit of 1) but skips `work::process()`
    /// until every `suspend` has a matching `resume`.
    pub fn suspend(&self) {
        critical_section::with(|_| self.suspended.set(self.suspended.get() + 1));
    }

    pub fn resume(&self) {
        critical_section::with(|_| {
            let c = self.suspended.get();
            if c > 0 {
                self.suspended.set(c - 1);
            }
        });
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.get() > 0
    }

    /// Blocks until `notify`d (pumping the transport while waiting, exactly
    /// like `Semaphore::take`), then runs one dispatcher pass unless
    /// suspended. Call this in a loop from the dedicated task; it never
    /// returns early without either having waited or having dispatched.
    pub fn run_once(&self, pump_transport: &mut impl FnMut()) {
        let _ = self.signal.take(Timeout::Forever, pump_transport);
        if !self.is_suspended() {
            work::process();
        }
    }
}

impl Default for DispatchTask {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn notify_wakes_run_once_which_dispatches_work() {
        static TASK: DispatchTask = DispatchTask::new();
        static RAN: AtomicU32 = AtomicU32::new(0);

        TASK.notify();
        RAN.store(0, Ordering::SeqCst);
        TASK.run_once(&mut || {
            // Pumping closure: nothing to ingest in this unit test, but
            // exercised to mirror the real wiring.
            RAN.fetch_add(1, Ordering::SeqCst);
        });
        // `give` was already pending, so `take` succeeds without ever
        // calling the pump closure.
        assert_eq!(RAN.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn suspended_task_still_consumes_the_signal_but_skips_dispatch() {
        static TASK: DispatchTask = DispatchTask::new();
        TASK.suspend();
        assert!(TASK.is_suspended());
        TASK.notify();
        // Runs to completion (the signal unblocks it) without panicking
        // even though dispatch is skipped.
        TASK.run_once(&mut || {});
        TASK.resume();
        assert!(!TASK.is_suspended());
    }

    #[test]
    fn suspend_resume_nests() {
        static TASK: DispatchTask = DispatchTask::new();
        TASK.suspend();
        TASK.suspend();
        TASK.resume();
        assert!(TASK.is_suspended());
        TASK.resume();
        assert!(!TASK.is_suspended());
    }
}
