//! Event-shaped mailbox payloads, and [`EvtBox`]: an owning handle to an
//! event packet sitting in the shared event pool until its bytes have
//! been copied out.
//!
//! CPU2 posts event packets into the shared pool and threads them onto
//! `EVT_QUEUE`/`SYSTEM_EVT_QUEUE`; draining those queues
//! (`ble::Ble::evt_handler`, `sys::Sys::evt_handler`) is the only place an
//! `EvtBox` is created. The underlying block is returned to CPU2's pool by
//! the free-buffer channel (`mm::free_buf_handler`), not by `EvtBox`'s
//! `Drop` — CPU2's transport layer, not ours, is the allocator of record.

use crate::unsafe_linked_list::LinkedListNode;

pub const TL_EVT_PAYLOAD_SIZE: usize = 255;

#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct Evt {
    pub evt_code: u8,
    pub payload_len: u8,
    pub payload: [u8; TL_EVT_PAYLOAD_SIZE],
}

impl Evt {
    /// The raw HCI event code (`0x3E` for LE Meta, `0xFF` for vendor
    /// events, and so on — callers compare this against the codes they
    /// care about, e.g. the coprocessor-ready notification's `18`).
    pub fn kind(&self) -> u8 {
        self.evt_code
    }
}

#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct EvtSerial {
    pub ty: u8,
    pub evt: Evt,
}

#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct EvtPacket {
    pub header: LinkedListNode,
    pub evt_serial: EvtSerial,
}

/// Command-complete-shaped SHCI response: status/credit accounting plus
/// the opcode it acknowledges. Vendor return parameters (e.g. GAP init's
/// service/characteristic handles) live past `cmd_code` in the same
/// payload and are reinterpreted by the caller that knows the opcode.
#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct CcEvt {
    pub num_cmd_packets: u8,
    pub cmd_code: u16,
    pub payload: [u8; 1],
}

/// Command-status-shaped event. Only ever sized (`TL_CS_EVT_SIZE`), never
/// decoded field-by-field by this crate.
#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct CsEvt {
    pub status: u8,
    pub num_cmd_packets: u8,
    pub cmd_code: u16,
}

/// Raised when an [`EvtBox`] is asked to size or serialise itself but its
/// declared payload length doesn't fit the caller's buffer.
#[derive(Debug, Clone, Copy)]
pub struct EventTooLarge {
    pub needed: usize,
}

/// Owning handle to an [`EvtPacket`] sitting in shared RAM.
///
/// `new` takes the raw pointer handed back by
/// [`crate::unsafe_linked_list::LST_remove_head`] — by construction,
/// always a live, fully written event packet, since CPU2 only threads a
/// node onto the queue after filling it in.
pub struct EvtBox {
    ptr: *mut EvtPacket,
}

impl EvtBox {
    pub fn new(ptr: *mut EvtPacket) -> Self {
        EvtBox { ptr }
    }

    /// The HCI event this packet carries, with the mailbox's own 1-byte
    /// type tag already stripped off.
    pub fn evt(&self) -> Evt {
        unsafe { (*self.ptr).evt_serial.evt }
    }

    /// Total length of the H:4-shaped `[event_code, param_len, params...]`
    /// tail this event will serialise to (the adapter's parser supplies
    /// the leading `0x04` type byte itself).
    pub fn size(&self) -> Result<usize, EventTooLarge> {
        let evt = self.evt();
        Ok(2 + evt.payload_len as usize)
    }

    /// Writes `[event_code, param_len, params...]` into `buf`.
    pub fn write(&self, buf: &mut [u8]) -> Result<(), EventTooLarge> {
        let evt = self.evt();
        let needed = 2 + evt.payload_len as usize;
        if buf.len() < needed {
            return Err(EventTooLarge { needed });
        }
        buf[0] = evt.evt_code;
        buf[1] = evt.payload_len;
        buf[2..needed].copy_from_slice(&evt.payload[..evt.payload_len as usize]);
        Ok(())
    }
}
