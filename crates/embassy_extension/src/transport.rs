//! The STM32WB55's IPCC mailbox, wired up as an `hci_adapter::Transport` —
//! the one concrete bottom-half transport this crate carries, standing in
//! for the UART/SPI ports other boards would use.
//!
//! Unlike a UART, the mailbox doesn't hand us a raw byte stream: CPU2
//! already delivers whole typed event packets (`TlMbox::dequeue_event`).
//! `poll_rx` bridges that gap by re-synthesising the H:4-framed bytes the
//! adapter's parser expects — `[0x04, event_code, param_len, params...]`
//! for every dequeued event — the same "patch in a type byte so the
//! generic HCI layer can treat us like a UART" trick the teacher's own
//! `RadioCoprocessor::process_events` already played (`buf[0] = 0x04`) to
//! satisfy `bluetooth_hci::host::uart::Hci`. `write` runs that the other
//! way: an already-H:4-framed send buffer is split back into mailbox
//! command/ACL writes by its leading type byte.

use hci_adapter::AdapterError;
use hci_adapter::Transport;

use crate::ipcc::Ipcc;
use crate::tl_mbox::consts::TlPacketType;
use crate::tl_mbox::shci::ShciBleInitCmdParam;
use crate::tl_mbox::{self, TlMbox};

/// `TL_BLECORE_EVT_COPROCESSOR_READY`: CPU2's notification that its BLE
/// stack has booted and is ready to take the SHCI init command. Observed
/// on the system channel, not the BLE one, before `is_ble_ready` flips.
const EVT_COPROCESSOR_READY: u8 = 18;

pub struct IpccTransport<'buf> {
    mbox: Option<TlMbox>,
    ipcc: Ipcc<'buf>,
    ble_config: ShciBleInitCmdParam,
    is_ble_ready: bool,
}

impl<'buf> IpccTransport<'buf> {
    pub fn new(ipcc: Ipcc<'buf>, ble_config: ShciBleInitCmdParam) -> Self {
        IpccTransport {
            mbox: None,
            ipcc,
            ble_config,
            is_ble_ready: false,
        }
    }

    /// Call from the `IPCC_C1_RX` interrupt handler. IRQ-safe: only parses
    /// mailbox framing and threads nodes onto the internal event queue,
    /// never allocates or calls back into the host.
    pub fn handle_ipcc_rx(&mut self) {
        if let Some(mbox) = self.mbox.as_mut() {
            mbox.interrupt_ipcc_rx_handler(&mut self.ipcc);
        }
        hci_adapter::pump::request_pump();
    }

    /// Call from the `IPCC_C1_TX` interrupt handler.
    pub fn handle_ipcc_tx(&mut self) {
        if let Some(mbox) = self.mbox.as_mut() {
            mbox.interrupt_ipcc_tx_handler(&mut self.ipcc);
        }
        hci_adapter::pump::request_pump();
    }
}

impl<'buf> Transport for IpccTransport<'buf> {
    fn setup(&mut self) -> Result<(), AdapterError> {
        self.mbox = Some(TlMbox::init(&mut self.ipcc));
        self.is_ble_ready = false;
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), AdapterError> {
        self.mbox = None;
        Ok(())
    }

    fn write(&mut self, frame: &[u8]) -> Result<(), AdapterError> {
        if self.mbox.is_none() {
            return Err(AdapterError::TransportError);
        }
        let ty = *frame.first().ok_or(AdapterError::InvalidArgument)?;
        let kind = TlPacketType::try_from(ty).map_err(|_| AdapterError::ProtocolError)?;
        match kind {
            TlPacketType::AclData => {
                // ACL-out is carried by the host stack's own ACL path in
                // this port; the adapter's send framing never produces an
                // ISO frame over IPCC, and full ACL-out plumbing is left
                // to the imported host, matching §1's scope boundary.
                Err(AdapterError::ProtocolError)
            }
            TlPacketType::BleCmd => {
                tl_mbox::ble::ble_send_cmd(&mut self.ipcc, frame);
                Ok(())
            }
            _ => Err(AdapterError::ProtocolError),
        }
    }

    fn poll_rx(&mut self, sink: &mut dyn FnMut(u8)) {
        let Some(mbox) = self.mbox.as_mut() else {
            return;
        };

        while let Some(evt) = mbox.dequeue_event() {
            let event = evt.evt();
            let Ok(size) = evt.size() else { continue };

            let mut framed = [0u8; 1 + 2 + 255];
            framed[0] = TlPacketType::BleEvt as u8;
            if evt.write(&mut framed[1..]).is_err() {
                continue;
            }

            if event.kind() == EVT_COPROCESSOR_READY && !self.is_ble_ready {
                tl_mbox::shci::shci_ble_init(&mut self.ipcc, self.ble_config);
                self.is_ble_ready = true;
            }

            for &b in &framed[..1 + size] {
                sink(b);
            }
        }
    }
}
