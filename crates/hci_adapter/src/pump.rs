//! The cooperative main loop: one place that ties the kernel's timer and
//! work-queue pumps to the adapter's transport/dispatch pump, so a port's
//! `main` only ever calls [`run_forever`].
//!
//! An IRQ handler that wants the pump to run sooner than its next periodic
//! tick calls [`request_pump`] instead of doing any work itself. The
//! request is a single coalescing flag, checked once per loop iteration
//! right after the pump body runs: if something requested a pump *while*
//! the previous one was in flight, the next iteration skips the idle sleep
//! entirely rather than waiting out the rest of the period — a request can
//! never be dropped between "pump just finished" and "about to sleep".

use core::cell::Cell;

use adapter_kernel::{timer, work};

use crate::config::PUMP_PERIOD_MS;
use crate::device::HciDevice;
use crate::transport::Transport;

struct PumpFlag(Cell<bool>);
unsafe impl Sync for PumpFlag {}
static PUMP_REQUESTED: PumpFlag = PumpFlag(Cell::new(false));

/// Registers the default work queues and wires `work::submit` to request an
/// early pump instead of waiting out the rest of the current period. Call
/// once at boot, before the first `work::submit` or `run_forever`.
pub fn init() {
    work::init_default_queues();
    work::set_notify_hook(request_pump);
}

/// Asks the pump to run again as soon as possible. Safe to call from IRQ
/// context; safe to call any number of times between pumps.
pub fn request_pump() {
    critical_section::with(|_| PUMP_REQUESTED.0.set(true));
}

fn take_requested() -> bool {
    critical_section::with(|_| {
        let requested = PUMP_REQUESTED.0.get();
        PUMP_REQUESTED.0.set(false);
        requested
    })
}

/// One pump iteration: expires due timers, runs one bounded batch of each
/// work queue, then drains and dispatches whatever the transport has
/// delivered. If the H:4 parser is sitting on a stalled frame, retries
/// once immediately — a slab block freed by this same iteration's
/// dispatch may already be enough to unstick it.
pub fn pump_once<T: Transport>(device: &HciDevice<'_, T>) {
    timer::process();
    work::process();
    device.poll_transport();
    while device.dispatch() > 0 {}
    if device.parser_stalled() {
        device.poll_transport();
        while device.dispatch() > 0 {}
    }
}

/// Runs the adapter forever. `idle` is called with the nominal period in
/// milliseconds whenever nothing requested an early pump; a port typically
/// implements it as a `WFI`-based delay, so the core can sleep between
/// pumps instead of busy-polling.
pub fn run_forever<T: Transport>(device: &HciDevice<'_, T>, mut idle: impl FnMut(u32)) -> ! {
    loop {
        pump_once(device);
        if take_requested() {
            continue;
        }
        idle(PUMP_PERIOD_MS);
    }
}
