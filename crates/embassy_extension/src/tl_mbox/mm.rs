//! Shared event-buffer accounting between this core and the BLE
//! coprocessor. CPU2 owns the event pool and hands blocks back to itself
//! once we've copied an event's bytes out; the only thing this side does
//! is acknowledge the "release buffer" channel so CPU2 can raise it again.

use crate::ipcc::Ipcc;

use super::channels;

pub struct MemoryManager;

impl MemoryManager {
    pub fn new() -> Self {
        MemoryManager
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn free_buf_handler(ipcc: &mut Ipcc) {
    ipcc.c1_set_tx_channel(channels::cpu1::IPCC_MM_RELEASE_BUFFER_CHANNEL, false);
}
