#![no_std]
#![no_main]

use bbqueue::BBBuffer;
use embassy_stm32::interrupt::{self, InterruptExt};
use embedded_alloc::Heap;

use hci_adapter::config::CONTROLLER_QUEUE_SIZE;
use hci_adapter::HciDevice;
use adapter_kernel::time::Timeout;

use rf::ipcc::Ipcc;
use rf::tl_mbox::shci::ShciBleInitCmdParam;
use rf::transport::IpccTransport;

use {defmt_rtt as _, panic_probe as _};

#[global_allocator]
static HEAP: Heap = Heap::empty();

type Device = HciDevice<'static, IpccTransport<'static>>;
static mut DEVICE: Option<Device> = None;

static CTRL_QUEUE: BBBuffer<CONTROLLER_QUEUE_SIZE> = BBBuffer::new();

/// HCI Reset, the exchange spec scenario 1 walks through end to end.
const OPCODE_HCI_RESET: u16 = 0x0C03;

fn device() -> &'static Device {
    unsafe { DEVICE.as_ref().expect("device not yet initialised") }
}

#[cortex_m_rt::entry]
fn main() -> ! {
    {
        use core::mem::MaybeUninit;
        const HEAP_SIZE: usize = 4096;
        static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
        unsafe { HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE) }
    }

    let p = embassy_stm32::init(Default::default());

    let ipcc_config = rf::ipcc::Config::default();
    let rx_irq = interrupt::take!(IPCC_C1_RX);
    let tx_irq = interrupt::take!(IPCC_C1_TX);
    rx_irq.disable();
    tx_irq.disable();

    let ipcc = Ipcc::new(p.IPCC, ipcc_config);

    let ble_config = ShciBleInitCmdParam {
        p_ble_buffer_address: 0,
        ble_buffer_size: 0,
        num_attr_record: 68,
        num_attr_serv: 8,
        attr_value_arr_size: 1344,
        num_of_links: 2,
        extended_packet_length_enable: 1,
        pr_write_list_size: 0x3A,
        mb_lock_count: 0x79,
        att_mtu: 156,
        slave_sca: 500,
        master_sca: 0,
        ls_source: 1,
        max_conn_event_length: 0xFFFFFFFF,
        hs_startup_time: 0x148,
        viterbi_enable: 1,
        ll_only: 0,
        hw_version: 0,
    };

    let transport = IpccTransport::new(ipcc, ble_config);
    let (producer, consumer) = CTRL_QUEUE.try_split().unwrap();
    let device = HciDevice::new(transport, producer, consumer);
    unsafe {
        DEVICE = Some(device);
    }

    rx_irq.set_handler(|_| device().with_transport(IpccTransport::handle_ipcc_rx));
    tx_irq.set_handler(|_| device().with_transport(IpccTransport::handle_ipcc_tx));
    rx_irq.enable();
    tx_irq.enable();

    hci_adapter::pump::init();

    let device = device();
    device
        .open(|kind, bytes| defmt::trace!("recv {:?} {:#04x}", kind, bytes))
        .expect("transport setup");

    device.send_command(OPCODE_HCI_RESET, &[]).expect("send HCI Reset");
    match device.wait_for_command_response(Timeout::Millis(2_000)) {
        Ok(()) => defmt::info!("HCI Reset acknowledged, coprocessor ready"),
        Err(e) => defmt::error!("HCI Reset timed out: {:?}", e),
    }

    hci_adapter::pump::run_forever(device, |period_ms| {
        cortex_m::asm::delay(period_ms * 1_000);
    })
}
