//! Outbound framing: wraps a command or ACL/ISO payload the host hands us
//! in its H:4 type octet and header, ready for the transport to write out.

use heapless::Vec;

use crate::config::MAX_SEND_FRAME;
use crate::error::AdapterError;
use crate::h4::PacketKind;

/// A framed outbound buffer: `[type][header][payload]`, ready to hand to
/// `Transport::write`.
pub type SendFrame = Vec<u8, MAX_SEND_FRAME>;

/// Frames an HCI command: opcode + parameters.
pub fn frame_command(opcode: u16, params: &[u8]) -> Result<SendFrame, AdapterError> {
    if params.len() > u8::MAX as usize {
        return Err(AdapterError::InvalidArgument);
    }
    let mut frame = SendFrame::new();
    push(&mut frame, PacketKind::Command.to_byte())?;
    let opcode_bytes = opcode.to_le_bytes();
    push(&mut frame, opcode_bytes[0])?;
    push(&mut frame, opcode_bytes[1])?;
    push(&mut frame, params.len() as u8)?;
    extend(&mut frame, params)?;
    Ok(frame)
}

/// Frames an ACL data fragment: connection handle + packet-boundary /
/// broadcast flags + payload.
pub fn frame_acl(handle: u16, pb_flag: u8, bc_flag: u8, payload: &[u8]) -> Result<SendFrame, AdapterError> {
    if handle > 0x0FFF || payload.len() > u16::MAX as usize {
        return Err(AdapterError::InvalidArgument);
    }
    let flags = ((bc_flag & 0x3) << 2) | (pb_flag & 0x3);
    let handle_flags = (handle & 0x0FFF) | ((flags as u16) << 12);
    let hf_bytes = handle_flags.to_le_bytes();
    let len_bytes = (payload.len() as u16).to_le_bytes();

    let mut frame = SendFrame::new();
    push(&mut frame, PacketKind::Acl.to_byte())?;
    push(&mut frame, hf_bytes[0])?;
    push(&mut frame, hf_bytes[1])?;
    push(&mut frame, len_bytes[0])?;
    push(&mut frame, len_bytes[1])?;
    extend(&mut frame, payload)?;
    Ok(frame)
}

fn push(frame: &mut SendFrame, byte: u8) -> Result<(), AdapterError> {
    frame.push(byte).map_err(|_| AdapterError::ResourceExhausted)
}

fn extend(frame: &mut SendFrame, bytes: &[u8]) -> Result<(), AdapterError> {
    frame.extend_from_slice(bytes).map_err(|_| AdapterError::ResourceExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_a_command_with_no_parameters() {
        let f = frame_command(0x0C03, &[]).unwrap(); // HCI_Reset
        assert_eq!(f.as_slice(), &[0x01, 0x03, 0x0C, 0x00]);
    }

    #[test]
    fn frames_a_command_with_parameters() {
        let f = frame_command(0x2006, &[0x01, 0x02]).unwrap();
        assert_eq!(f.as_slice(), &[0x01, 0x06, 0x20, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn frames_acl_with_packet_boundary_flags() {
        let f = frame_acl(0x0041, 0b10, 0b00, &[0xAA, 0xBB]).unwrap();
        assert_eq!(f.as_slice(), &[0x02, 0x41, 0x20, 0x02, 0x00, 0xAA, 0xBB]);
    }

    #[test]
    fn rejects_an_oversized_command_parameter_block() {
        let params = [0u8; 256];
        assert!(frame_command(0x0C03, &params).is_err());
    }
}
