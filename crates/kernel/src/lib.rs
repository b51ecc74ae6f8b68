//! Cooperative-kernel HAL: the Zephyr-shaped primitives (timers, work
//! queues, semaphores, mutexes/atomics, memory slabs, intrusive FIFOs) that
//! let a thread-assuming BLE host run on an embedded runtime with no
//! kernel threads dedicated to Bluetooth.
//!
//! Nothing in this crate knows about HCI, H:4 framing, or any particular
//! transport — see `hci_adapter` for that. This crate only provides the
//! "single worker thread processes work items to completion" illusion the
//! host is built around.

#![cfg_attr(not(any(test, feature = "sim")), no_std)]

pub mod context;
pub mod delayable;
pub mod dispatch_task;
pub mod error;
pub mod fifo;
pub mod misc;
pub mod sem;
pub mod slab;
pub mod sync;
pub mod time;
pub mod timer;
pub mod work;

pub use error::KernelError;
pub use time::{Timeout, Timepoint};
