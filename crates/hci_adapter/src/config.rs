//! Compile-time configuration surface. Cargo features select the tiered
//! `const`s the host stack and the buffer pools are sized from, mirroring
//! the teacher crate's `default = ["defmt"]` / `ms` feature convention.

#[cfg(feature = "max-conn-8")]
pub const MAX_CONN: usize = 8;
#[cfg(all(feature = "max-conn-4", not(feature = "max-conn-8")))]
pub const MAX_CONN: usize = 4;
#[cfg(all(feature = "max-conn-1", not(any(feature = "max-conn-4", feature = "max-conn-8"))))]
pub const MAX_CONN: usize = 1;
#[cfg(not(any(feature = "max-conn-1", feature = "max-conn-4", feature = "max-conn-8")))]
pub const MAX_CONN: usize = 4;

pub const ROLE_BROADCASTER: bool = cfg!(feature = "role-broadcaster");
pub const ROLE_OBSERVER: bool = cfg!(feature = "role-observer");
pub const ROLE_PERIPHERAL: bool = cfg!(feature = "role-peripheral");
pub const ROLE_CENTRAL: bool = cfg!(feature = "role-central");

pub const SMP_ENABLED: bool = cfg!(feature = "smp");
pub const PRIVACY_ENABLED: bool = cfg!(feature = "privacy");

/// Largest single EVT frame (header + payload) the parser will ever need to
/// buffer: 2-byte header + 255-byte max HCI event payload.
pub const EVT_BUF_SIZE: usize = 2 + 255;
pub const EVT_BUF_COUNT: usize = 8;

/// Largest single ACL/ISO frame (4-byte header + payload), sized from
/// `L2CAP_TX_MTU` plus L2CAP framing overhead.
pub const ACL_BUF_SIZE: usize = 4 + L2CAP_TX_MTU + 8;
pub const ACL_BUF_COUNT: usize = 4;

pub const ATT_PREPARE_COUNT: usize = 4;
pub const L2CAP_TX_BUF_COUNT: usize = 4;
pub const L2CAP_TX_MTU: usize = 251;

/// RX ring depth (ring of completed-packet descriptors between IRQ context
/// and the main pump).
pub const RXQ_DEPTH: usize = 32;

/// Batch size drained and priority-sorted per pump iteration.
pub const DISPATCH_BATCH: usize = 16;

/// Largest framed send buffer (`[type ∥ header ∥ payload]`).
pub const MAX_SEND_FRAME: usize = 4 + ACL_BUF_SIZE;

/// Byte capacity of the `bbqueue` ring bridging delivered packets to a
/// `bluetooth_hci::Controller`-style pull reader.
pub const CONTROLLER_QUEUE_SIZE: usize = 512;

/// Periodic drumbeat between main-pump iterations when nothing has asked
/// for an out-of-cycle wakeup via `pump::request_pump`.
pub const PUMP_PERIOD_MS: u32 = 10;
