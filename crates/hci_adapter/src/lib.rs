//! H:4 framing, packet pooling, priority dispatch and the send path that
//! let an externally-written BLE host run its HCI traffic over
//! `adapter-kernel`'s cooperative scheduling primitives instead of a
//! thread-based transport.
#![cfg_attr(not(any(test, feature = "sim")), no_std)]

pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod h4;
pub mod pump;
pub mod rxq;
pub mod send;
pub mod transport;

pub use device::HciDevice;
pub use error::AdapterError;
pub use h4::{Packet, PacketHandle, PacketKind};
pub use transport::Transport;
