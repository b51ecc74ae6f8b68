//! The host-facing façade: ties the H:4 parser, rx ring, priority dispatch
//! and send framing to a concrete [`Transport`], and hands delivered
//! packets both to a plain callback and to a `bbqueue` ring a
//! `bluetooth_hci::Controller` impl can pull from.
//!
//! `HciDevice` itself never commits to a `bluetooth_hci::Vendor` type —
//! ports that need `Controller` wrap this struct and implement the trait
//! against `read_into`/`peek`, the way the teacher crate's
//! `RadioCoprocessor` implements `Controller` over its own bbqueue pair.

use core::cell::{Cell, RefCell};

use bbqueue::{Consumer, Producer};

use adapter_kernel::sem::Semaphore;
use adapter_kernel::time::Timeout;

use crate::config::CONTROLLER_QUEUE_SIZE;
use crate::dispatch;
use crate::error::AdapterError;
use crate::h4::{Parser, PacketKind};
use crate::rxq::RxQueue;
use crate::send::{frame_acl, frame_command};
use crate::transport::Transport;

/// Invoked once per delivered packet, in priority order, from
/// [`HciDevice::dispatch`].
pub type RecvCallback = fn(PacketKind, &[u8]);

pub struct HciDevice<'buf, T: Transport> {
    transport: RefCell<T>,
    parser: Parser,
    rxq: RxQueue,
    recv_cb: Cell<Option<RecvCallback>>,
    /// Given every time a Command Complete/Status event is delivered;
    /// the host's synchronous `send_cmd(); wait_for_response()` idiom
    /// takes this via [`adapter_kernel::sem::Semaphore::take`], which
    /// pumps the transport and work queue while it waits.
    pub command_ready: Semaphore,
    ctrl_producer: RefCell<Producer<'buf, CONTROLLER_QUEUE_SIZE>>,
    ctrl_consumer: RefCell<Consumer<'buf, CONTROLLER_QUEUE_SIZE>>,
}

const EVT_COMMAND_COMPLETE: u8 = 0x0E;
const EVT_COMMAND_STATUS: u8 = 0x0F;

impl<'buf, T: Transport> HciDevice<'buf, T> {
    pub fn new(
        transport: T,
        ctrl_producer: Producer<'buf, CONTROLLER_QUEUE_SIZE>,
        ctrl_consumer: Consumer<'buf, CONTROLLER_QUEUE_SIZE>,
    ) -> Self {
        HciDevice {
            transport: RefCell::new(transport),
            parser: Parser::new(),
            rxq: RxQueue::new(),
            recv_cb: Cell::new(None),
            command_ready: Semaphore::new(0, 1),
            ctrl_producer: RefCell::new(ctrl_producer),
            ctrl_consumer: RefCell::new(ctrl_consumer),
        }
    }

    pub fn set_recv_callback(&self, cb: RecvCallback) {
        self.recv_cb.set(Some(cb));
    }

    pub fn setup(&self) -> Result<(), AdapterError> {
        self.transport.borrow_mut().setup()
    }

    pub fn teardown(&self) -> Result<(), AdapterError> {
        self.transport.borrow_mut().teardown()
    }

    /// The host-facing `open`: installs `recv_cb`, resets the H:4 parser to
    /// a clean `Idle` state, then brings the transport up. No completed
    /// packet reaches `recv_cb` until this returns successfully.
    ///
    /// Must not pump the work queue synchronously from here — any init work
    /// the host submits in response to `open` has to wait for the first
    /// scheduled pump (`hci_adapter::pump::run_forever`/`pump_once`), or its
    /// own `sem::take` wait loop would find the dispatcher's re-entrancy
    /// guard already held and deadlock waiting for a response that the pump
    /// never got a chance to deliver.
    pub fn open(&self, recv_cb: RecvCallback) -> Result<(), AdapterError> {
        self.recv_cb.set(Some(recv_cb));
        self.parser.reset();
        self.setup()
    }

    /// The host-facing `close`: clears the callback so no further
    /// deliveries happen after this returns, resets the parser, and tears
    /// the transport down.
    pub fn close(&self) -> Result<(), AdapterError> {
        self.recv_cb.set(None);
        self.parser.reset();
        self.teardown()
    }

    pub fn send_command(&self, opcode: u16, params: &[u8]) -> Result<(), AdapterError> {
        let frame = frame_command(opcode, params)?;
        self.transport.borrow_mut().write(frame.as_slice())
    }

    pub fn send_acl(&self, handle: u16, pb_flag: u8, bc_flag: u8, payload: &[u8]) -> Result<(), AdapterError> {
        let frame = frame_acl(handle, pb_flag, bc_flag, payload)?;
        self.transport.borrow_mut().write(frame.as_slice())
    }

    /// Drains whatever raw bytes the transport has received, running each
    /// one through the H:4 parser and enqueuing finished frames onto the
    /// rx ring. Cheap to call repeatedly; a no-op once the transport is
    /// drained.
    pub fn poll_transport(&self) {
        let parser = &self.parser;
        let rxq = &self.rxq;
        self.transport.borrow_mut().poll_rx(&mut |byte| {
            if let Ok(Some(pkt)) = parser.feed(byte) {
                let handle = pkt.into_handle();
                // Overflow drops and frees the handle internally; nothing
                // further to do here.
                let _ = rxq.push(handle);
            }
        });
    }

    /// True if the H:4 parser has a complete frame stalled on pool space —
    /// a hint to retry `poll_transport` sooner than the next scheduled tick.
    pub fn parser_stalled(&self) -> bool {
        self.parser.is_stalled()
    }

    /// Priority-sorts and delivers one batch of received packets: to the
    /// recv callback, and to the `Controller`-style byte ring. Returns the
    /// number of packets delivered.
    pub fn dispatch(&self) -> usize {
        let cb = self.recv_cb.get();
        let command_ready = &self.command_ready;
        let mut producer = self.ctrl_producer.borrow_mut();
        dispatch::drain_and_dispatch(&self.rxq, |pkt| {
            let bytes = pkt.as_slice();
            if pkt.kind() == PacketKind::Event && !bytes.is_empty() {
                if bytes[0] == EVT_COMMAND_COMPLETE || bytes[0] == EVT_COMMAND_STATUS {
                    command_ready.give();
                }
            }
            if let Some(cb) = cb {
                cb(pkt.kind(), bytes);
            }
            if let Ok(mut grant) = producer.grant_exact(bytes.len()) {
                grant.buf().copy_from_slice(bytes);
                grant.commit(bytes.len());
            }
        })
    }

    /// Waits for a command-complete/status event, pumping the transport
    /// and work queue while blocked. Mirrors the teacher's
    /// `perform_command` wait idiom, made synchronous.
    pub fn wait_for_command_response(&self, timeout: Timeout) -> Result<(), AdapterError> {
        self.command_ready
            .take(timeout, &mut || {
                self.poll_transport();
                self.dispatch();
            })
            .map_err(AdapterError::from)
    }

    /// Pull-style read for a `bluetooth_hci::Controller` impl built on top
    /// of this device: copies up to `buf.len()` already-dispatched bytes.
    pub fn read_into(&self, buf: &mut [u8]) -> nb::Result<usize, AdapterError> {
        let mut consumer = self.ctrl_consumer.borrow_mut();
        match consumer.read() {
            Ok(grant) => {
                let n = buf.len().min(grant.buf().len());
                buf[..n].copy_from_slice(&grant.buf()[..n]);
                grant.release(n);
                Ok(n)
            }
            Err(bbqueue::Error::InsufficientSize) => Err(nb::Error::WouldBlock),
            Err(_) => Err(nb::Error::Other(AdapterError::TransportError)),
        }
    }

    /// Pull-style single-byte lookahead at offset `n` without consuming it.
    pub fn peek(&self, n: usize) -> nb::Result<u8, AdapterError> {
        let mut consumer = self.ctrl_consumer.borrow_mut();
        match consumer.read() {
            Ok(grant) => {
                if n >= grant.buf().len() {
                    grant.release(0);
                    return Err(nb::Error::WouldBlock);
                }
                let byte = grant.buf()[n];
                grant.release(0);
                Ok(byte)
            }
            Err(bbqueue::Error::InsufficientSize) => Err(nb::Error::WouldBlock),
            Err(_) => Err(nb::Error::Other(AdapterError::TransportError)),
        }
    }

    pub fn dropped_rx_count(&self) -> u32 {
        self.rxq.dropped()
    }

    /// Runs `f` against the transport directly, bypassing the H:4/dispatch
    /// path. For IRQ handlers that need to reach transport-specific
    /// bottom-half entry points (e.g. a mailbox's rx/tx interrupt
    /// handlers) that aren't part of the `Transport` trait itself.
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.transport.borrow_mut())
    }
}
