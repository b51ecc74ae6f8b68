//! Uptime, sleep, panic/oops and ISR detection.

use core::sync::atomic::{AtomicU32, Ordering};
use embedded_hal::blocking::delay::DelayMs;

static UPTIME_MS: AtomicU32 = AtomicU32::new(0);

/// Advances the uptime counter. Call this from the port's tick source (a
/// SysTick or LPTIM interrupt); nothing else in this crate drives the clock.
pub fn tick(elapsed_ms: u32) {
    UPTIME_MS.fetch_add(elapsed_ms, Ordering::Relaxed);
}

/// Monotonic millisecond counter, wraps every ~49.7 days.
pub fn uptime() -> crate::time::Timepoint {
    UPTIME_MS.load(Ordering::Relaxed)
}

/// Sleeps for `ms` milliseconds using the port's blocking delay. `ms == 0`
/// is treated as a yield rather than a true sleep.
pub fn sleep(ms: u32, delay: &mut impl DelayMs<u32>) {
    if ms == 0 {
        return;
    }
    delay.delay_ms(ms);
}

/// Reports a fatal, unrecoverable condition and halts by handing off to the
/// port's configured panic handler (`panic-probe` in the demo app).
#[cfg_attr(feature = "sim", allow(unused_variables))]
pub fn panic(msg: &'static str) -> ! {
    #[cfg(feature = "defmt")]
    defmt::error!("fatal: {=str}", msg);
    #[cfg(not(feature = "sim"))]
    {
        panic!("{}", msg)
    }
    #[cfg(feature = "sim")]
    {
        std::panic!("{}", msg)
    }
}

/// Reports a recoverable error and continues.
pub fn oops(msg: &str) {
    #[cfg(feature = "defmt")]
    defmt::error!("oops: {=str}", msg);
    #[cfg(not(feature = "defmt"))]
    let _ = msg;
}

/// Hints to the core that this pass found nothing to do, without a true
/// blocking sleep. [`crate::sem::Semaphore::take`]'s wait loop calls this
/// once per iteration after pumping the transport and the work queue.
#[cfg(not(feature = "sim"))]
pub fn yield_now() {
    cortex_m::asm::nop();
}

#[cfg(feature = "sim")]
pub fn yield_now() {}

/// Reports whether the caller is executing in interrupt context.
#[cfg(not(feature = "sim"))]
pub fn is_in_isr() -> bool {
    use cortex_m::peripheral::{scb::VectActive, SCB};
    !matches!(SCB::vect_active(), VectActive::ThreadMode)
}

#[cfg(feature = "sim")]
pub fn is_in_isr() -> bool {
    false
}
