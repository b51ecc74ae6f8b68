//! Kernel-level error taxonomy, shared with the higher HCI layers.

/// A kernel-primitive failure. Mirrors the adapter's error taxonomy but is
/// restricted to the subset the HAL itself can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KernelError {
    /// A caller passed a null pointer, zero-sized slab block, or similar.
    InvalidArgument,
    /// A memory slab has no free blocks, or a bounded ring is full.
    ResourceExhausted,
    /// `Semaphore::take` returned before the deadline was reached but the
    /// count never became positive.
    WouldBlock,
    /// `Semaphore::take` reached its deadline.
    TimedOut,
}
