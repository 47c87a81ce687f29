//! Wire framing: a two-byte big-endian length followed by the body.

use std::io::{Read, Write};

use crate::error::HsmError;

/// Largest body a frame can declare.
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Read one length-prefixed frame. Returns `None` on a clean end of
/// stream before the length prefix.
pub fn read_frame<R: Read>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>> {
    let mut length = [0u8; 2];
    match reader.read_exact(&mut length) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }

    let body_len = u16::from_be_bytes(length) as usize;
    let mut body = vec![0u8; body_len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Write one length-prefixed frame.
pub fn write_frame<W: Write>(writer: &mut W, body: &[u8]) -> std::io::Result<()> {
    debug_assert!(body.len() <= MAX_FRAME_LEN);
    writer.write_all(&(body.len() as u16).to_be_bytes())?;
    writer.write_all(body)?;
    writer.flush()
}

/// Frame a body into a standalone buffer.
pub fn frame(body: &[u8]) -> Result<Vec<u8>, HsmError> {
    if body.len() > MAX_FRAME_LEN {
        return Err(HsmError::InvalidInput("frame body too long"));
    }
    let mut framed = Vec::with_capacity(2 + body.len());
    framed.extend_from_slice(&(body.len() as u16).to_be_bytes());
    framed.extend_from_slice(body);
    Ok(framed)
}
