//! Mutex, spinlock and atomics for a single-core cooperative host.
//!
//! There is exactly one logical worker context plus IRQ preemption, so these
//! primitives degenerate: the spinlock is a bare IRQ-disable/restore pair,
//! the mutex only tracks re-entrancy depth for assertions, and the atomics
//! are a spinlock wrapped around a plain integer.

use core::cell::Cell;

/// IRQ-disable / IRQ-restore critical section. The restore token is the
/// lock key the caller must hold onto and release exactly once.
///
/// Critical sections must stay short: no allocation, no blocking, no
/// callbacks back into the host while held.
#[must_use = "dropping this immediately re-enables interrupts"]
pub struct SpinlockGuard(critical_section::RestoreState);

pub fn spin_lock() -> SpinlockGuard {
    SpinlockGuard(unsafe { critical_section::acquire() })
}

impl Drop for SpinlockGuard {
    fn drop(&mut self) {
        unsafe { critical_section::release(self.0) }
    }
}

/// A mutex that never actually blocks on this host, but tracks acquisition
/// depth so double-locking bugs show up as a debug assertion instead of
/// silently succeeding.
pub struct Mutex {
    depth: Cell<u32>,
}

unsafe impl Sync for Mutex {}

impl Mutex {
    pub const fn new() -> Self {
        Self { depth: Cell::new(0) }
    }

    pub fn lock(&self) -> MutexGuard<'_> {
        critical_section::with(|_| {
            debug_assert_eq!(self.depth.get(), 0, "host assumed this mutex was not re-entrant");
            self.depth.set(self.depth.get() + 1);
        });
        MutexGuard { mutex: self }
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MutexGuard<'a> {
    mutex: &'a Mutex,
}

impl Drop for MutexGuard<'_> {
    fn drop(&mut self) {
        critical_section::with(|_| self.mutex.depth.set(self.mutex.depth.get() - 1));
    }
}

/// A `u32` protected by the spinlock above, exposing the load/store/RMW
/// surface the imported host expects from `atomic_t`.
pub struct AtomicCell {
    value: Cell<u32>,
}

unsafe impl Sync for AtomicCell {}

impl AtomicCell {
    pub const fn new(initial: u32) -> Self {
        Self { value: Cell::new(initial) }
    }

    pub fn load(&self) -> u32 {
        critical_section::with(|_| self.value.get())
    }

    pub fn store(&self, v: u32) {
        critical_section::with(|_| self.value.set(v));
    }

    pub fn fetch_add(&self, delta: u32) -> u32 {
        critical_section::with(|_| {
            let old = self.value.get();
            self.value.set(old.wrapping_add(delta));
            old
        })
    }

    pub fn fetch_sub(&self, delta: u32) -> u32 {
        critical_section::with(|_| {
            let old = self.value.get();
            self.value.set(old.wrapping_sub(delta));
            old
        })
    }

    pub fn fetch_and(&self, mask: u32) -> u32 {
        critical_section::with(|_| {
            let old = self.value.get();
            self.value.set(old & mask);
            old
        })
    }

    pub fn fetch_or(&self, mask: u32) -> u32 {
        critical_section::with(|_| {
            let old = self.value.get();
            self.value.set(old | mask);
            old
        })
    }

    pub fn fetch_xor(&self, mask: u32) -> u32 {
        critical_section::with(|_| {
            let old = self.value.get();
            self.value.set(old ^ mask);
            old
        })
    }

    pub fn bit_set(&self, bit: u32) -> bool {
        let old = self.fetch_or(1 << bit);
        (old >> bit) & 1 != 0
    }

    pub fn bit_clear(&self, bit: u32) -> bool {
        let old = self.fetch_and(!(1 << bit));
        (old >> bit) & 1 != 0
    }

    pub fn bit_test(&self, bit: u32) -> bool {
        (self.load() >> bit) & 1 != 0
    }

    /// Succeeds iff the stored value equals `current` at the instant the
    /// critical section is entered; returns the observed value either way.
    pub fn compare_and_swap(&self, current: u32, new: u32) -> Result<u32, u32> {
        critical_section::with(|_| {
            let old = self.value.get();
            if old == current {
                self.value.set(new);
                Ok(old)
            } else {
                Err(old)
            }
        })
    }
}
