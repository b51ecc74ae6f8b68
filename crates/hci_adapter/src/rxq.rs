//! Fixed-capacity ring carrying completed-packet handles from the transport's
//! receive context (ISR) to the main pump. A ring, not the intrusive
//! `adapter_kernel::fifo::List`, because `PacketHandle` is a plain `Copy`
//! descriptor rather than an intrusive node — there is no spare storage
//! inside a received HCI frame to park link pointers in.

use core::cell::Cell;

use crate::config::RXQ_DEPTH;
use crate::error::AdapterError;
use crate::h4::PacketHandle;

struct Slot {
    handle: Cell<Option<PacketHandle>>,
}

/// SPSC ring: the transport's receive context pushes, the pump pops.
/// Indices are guarded by a critical section since on most ports the
/// "producer" side runs at interrupt priority relative to the pump.
pub struct RxQueue {
    slots: [Slot; RXQ_DEPTH],
    head: Cell<usize>, // next to pop
    tail: Cell<usize>, // next to push
    len: Cell<usize>,
    dropped: Cell<u32>,
}

unsafe impl Sync for RxQueue {}

impl RxQueue {
    pub const fn new() -> Self {
        const EMPTY: Slot = Slot { handle: Cell::new(None) };
        RxQueue {
            slots: [EMPTY; RXQ_DEPTH],
            head: Cell::new(0),
            tail: Cell::new(0),
            len: Cell::new(0),
            dropped: Cell::new(0),
        }
    }

    /// Pushes a received packet's handle. If the ring is full the handle's
    /// block is freed immediately and the drop is counted rather than
    /// overwriting a not-yet-consumed slot — losing a frame is preferable
    /// to corrupting the ring.
    pub fn push(&self, handle: PacketHandle) -> Result<(), AdapterError> {
        critical_section::with(|_| {
            if self.len.get() == RXQ_DEPTH {
                self.dropped.set(self.dropped.get().wrapping_add(1));
                drop(handle.into_packet());
                return Err(AdapterError::ResourceExhausted);
            }
            let tail = self.tail.get();
            self.slots[tail].handle.set(Some(handle));
            self.tail.set((tail + 1) % RXQ_DEPTH);
            self.len.set(self.len.get() + 1);
            Ok(())
        })
    }

    /// Pops the oldest received packet's handle, if any.
    pub fn pop(&self) -> Option<PacketHandle> {
        critical_section::with(|_| {
            if self.len.get() == 0 {
                return None;
            }
            let head = self.head.get();
            let h = self.slots[head].handle.take();
            self.head.set((head + 1) % RXQ_DEPTH);
            self.len.set(self.len.get() - 1);
            h
        })
    }

    pub fn len(&self) -> usize {
        critical_section::with(|_| self.len.get())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of packets dropped because the ring was full.
    pub fn dropped(&self) -> u32 {
        critical_section::with(|_| self.dropped.get())
    }
}

impl Default for RxQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::h4::{Packet, PacketKind};
    use adapter_kernel::slab::MemSlab;
    use adapter_kernel::time::Timeout;

    static TEST_SLAB: MemSlab<8, 2> = MemSlab::new();

    fn make_handle(kind: PacketKind) -> PacketHandle {
        // Build a packet using the adapter's real pools via the parser's
        // public entry point would pull in config sizing; for ring-only
        // tests it's simpler to feed a tiny local slab through the same
        // Packet shape via the parser, so drive a real frame instead.
        let p = crate::h4::Parser::new();
        let bytes: &[u8] = match kind {
            PacketKind::Event => &[0x04, 0xFF, 0x00],
            _ => &[0x04, 0xFE, 0x00],
        };
        let mut pkt = None;
        for &b in bytes {
            if let Some(p) = p.feed(b).unwrap() {
                pkt = Some(p);
            }
        }
        pkt.unwrap().into_handle()
    }

    #[test]
    fn fifo_order_is_preserved() {
        let q = RxQueue::new();
        q.push(make_handle(PacketKind::Event)).unwrap();
        q.push(make_handle(PacketKind::Event)).unwrap();
        assert_eq!(q.len(), 2);
        let a = q.pop().unwrap();
        let b = q.pop().unwrap();
        drop(a.into_packet());
        drop(b.into_packet());
        assert!(q.is_empty());
    }

    #[test]
    fn overflow_frees_instead_of_overwriting() {
        let q = RxQueue::new();
        for _ in 0..RXQ_DEPTH {
            q.push(make_handle(PacketKind::Event)).unwrap();
        }
        assert!(q.push(make_handle(PacketKind::Event)).is_err());
        assert_eq!(q.dropped(), 1);
        while let Some(h) = q.pop() {
            drop(h.into_packet());
        }
    }
}
