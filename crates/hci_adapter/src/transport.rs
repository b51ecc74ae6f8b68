//! The port-boundary contract: what a concrete link (UART, SPI, an
//! inter-processor mailbox, …) must provide so [`crate::device::HciDevice`]
//! can drive it without knowing which one it is.

use crate::error::AdapterError;

/// A byte-level HCI transport. Implementations own the physical link and
/// any IRQ wiring it needs; `HciDevice` only ever calls these four methods.
pub trait Transport {
    /// Brings the link up (clocks, IRQ unmasking, peer handshake). Called
    /// once before the first `write`/`poll_rx`.
    fn setup(&mut self) -> Result<(), AdapterError>;

    /// Tears the link back down. Called on `HciDevice` shutdown/reset.
    fn teardown(&mut self) -> Result<(), AdapterError>;

    /// Writes a fully framed H:4 buffer. Must not return until the bytes
    /// are handed to the link (queued for DMA, pushed into the peer's
    /// mailbox, …); partial writes are a transport bug, not a valid
    /// return.
    fn write(&mut self, frame: &[u8]) -> Result<(), AdapterError>;

    /// Drains whatever bytes have arrived since the last call, feeding
    /// each one to `sink`. Called from the pump, never from an ISR
    /// directly — ISRs feed their own ring, and `poll_rx` drains it.
    fn poll_rx(&mut self, sink: &mut dyn FnMut(u8));
}
