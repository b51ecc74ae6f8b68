//! The one-byte packet-type tag every mailbox packet's serial header
//! carries, telling the receiving side which payload shape follows it.
//! CPU1 and CPU2 agree on these values as part of the wireless firmware's
//! fixed transport-layer contract; they are not negotiated at runtime.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TlPacketType {
    BleCmd = 0x01,
    AclData = 0x02,
    BleEvt = 0x04,
    OtCmd = 0x08,
    ThreadEvt = 0x09,
    CliCmd = 0x0A,
    CliEvt = 0x0B,
    SysCmd = 0x10,
    SysEvt = 0x12,
    TracesEvt = 0x18,
}

/// Returned when a byte doesn't match any known `TlPacketType`.
#[derive(Debug, Clone, Copy)]
pub struct UnknownPacketType(pub u8);

impl TryFrom<u8> for TlPacketType {
    type Error = UnknownPacketType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x01 => TlPacketType::BleCmd,
            0x02 => TlPacketType::AclData,
            0x04 => TlPacketType::BleEvt,
            0x08 => TlPacketType::OtCmd,
            0x09 => TlPacketType::ThreadEvt,
            0x0A => TlPacketType::CliCmd,
            0x0B => TlPacketType::CliEvt,
            0x10 => TlPacketType::SysCmd,
            0x12 => TlPacketType::SysEvt,
            0x18 => TlPacketType::TracesEvt,
            other => return Err(UnknownPacketType(other)),
        })
    }
}
