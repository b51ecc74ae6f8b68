//! IPCC channel assignment. CPU1 (this core) and CPU2 (the BLE/Thread
//! coprocessor) each own six channels; which logical traffic rides which
//! channel number is a fixed convention the wireless firmware expects,
//! not something either side negotiates at runtime.

use crate::ipcc::IpccChannel;

/// Channels CPU1 raises to hand work to CPU2, or to acknowledge a signal
/// CPU2 raised on the matching rx channel.
pub mod cpu1 {
    use super::IpccChannel;

    pub const IPCC_BLE_CMD_CHANNEL: IpccChannel = IpccChannel::Channel1;
    pub const IPCC_SYSTEM_CMD_RSP_CHANNEL: IpccChannel = IpccChannel::Channel2;
    pub const IPCC_THREAD_OT_CMD_RSP_CHANNEL: IpccChannel = IpccChannel::Channel2;
    pub const IPCC_MM_RELEASE_BUFFER_CHANNEL: IpccChannel = IpccChannel::Channel4;
    pub const IPCC_THREAD_CLI_CMD_CHANNEL: IpccChannel = IpccChannel::Channel5;
    pub const IPCC_HCI_ACL_DATA_CHANNEL: IpccChannel = IpccChannel::Channel6;
}

/// Channels CPU2 raises to signal CPU1 that something is ready to read.
pub mod cpu2 {
    use super::IpccChannel;

    pub const IPCC_SYSTEM_EVENT_CHANNEL: IpccChannel = IpccChannel::Channel1;
    pub const IPCC_BLE_EVENT_CHANNEL: IpccChannel = IpccChannel::Channel2;
    pub const IPCC_THREAD_NOTIFICATION_ACK_CHANNEL: IpccChannel = IpccChannel::Channel3;
    pub const IPCC_TRACES_CHANNEL: IpccChannel = IpccChannel::Channel4;
    pub const IPCC_THREAD_CLI_NOTIFICATION_ACK_CHANNEL: IpccChannel = IpccChannel::Channel5;
}
