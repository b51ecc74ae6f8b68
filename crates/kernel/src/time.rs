//! Monotonic timepoints and timeout sentinels.
//!
//! A [`Timepoint`] is a 32-bit millisecond counter that wraps; all
//! comparisons must go through [`before`] rather than `<` so that wraparound
//! is handled the same way everywhere.

/// A monotonic millisecond counter. Wraps every ~49.7 days.
pub type Timepoint = u32;

/// Returns `true` if `a` occurred strictly before `b`, correctly handling
/// wraparound of the 32-bit counter (valid as long as the two points are
/// within `i32::MAX` ticks of each other, which holds for any timeout this
/// crate accepts).
pub fn before(a: Timepoint, b: Timepoint) -> bool {
    (a.wrapping_sub(b) as i32) < 0
}

/// A wait duration, kept distinct from [`Timepoint`] so that the reserved
/// sentinels can never collide with a real tick value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timeout {
    /// Return immediately if the resource is not already available.
    NoWait,
    /// Wait with no deadline.
    Forever,
    /// Wait up to this many milliseconds.
    Millis(u32),
}
