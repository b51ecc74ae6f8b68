//! Raw wire-level packet layouts CPU1 and CPU2 overlay onto the same
//! mailbox memory. Every packet begins with the list-node header it's
//! threaded onto a queue with, followed by a serial payload whose shape
//! depends on which channel delivered it — `CmdPacket` for commands sent
//! to CPU2, `AclDataPacket` for outbound ACL data.

use crate::unsafe_linked_list::LinkedListNode;

/// Largest command payload the mailbox moves in one packet.
pub const TL_CMD_PAYLOAD_SIZE: usize = 255;

#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct Cmd {
    pub cmd_code: u16,
    pub payload_len: u8,
    pub payload: [u8; TL_CMD_PAYLOAD_SIZE],
}

#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct CmdSerial {
    pub ty: u8,
    pub cmd: Cmd,
}

#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct CmdPacket {
    pub header: LinkedListNode,
    pub cmdserial: CmdSerial,
}

#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct AclDataSerial {
    pub ty: u8,
    pub handle: u16,
    pub length: u16,
    /// Flexible-array-in-spirit: the real payload runs past this single
    /// placeholder byte, sized by `length`. Callers only ever take this
    /// struct's address and write `ty`/`handle`/`length` through it, never
    /// index `acl_data` directly.
    pub acl_data: [u8; 1],
}

#[derive(Debug, Clone, Copy)]
#[repr(C, packed)]
pub struct AclDataPacket {
    pub header: LinkedListNode,
    pub acl_data_serial: AclDataSerial,
}
