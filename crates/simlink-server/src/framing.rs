//! Length-prefixed framing for stream transports.
//!
//! Every payload on a TCP channel is a 4-byte **little-endian** `u32` length
//! prefix followed by that many bytes.
//!
//! # Wire format
//!
//! ```text
//! +----------------+------------------+
//! | Length (4B LE) | Payload          |
//! +----------------+------------------+
//! ```

use std::io::{Read, Write};

use crate::protocol::{MAX_MESSAGE_SIZE, ProtocolError};

/// Read one frame from a stream.
///
/// Returns `Ok(None)` if the stream reaches EOF before any bytes are read
/// (clean disconnect). Returns an error if the prefix or payload cannot be
/// read or the payload exceeds [`MAX_MESSAGE_SIZE`].
pub fn read_frame(reader: &mut impl Read) -> Result<Option<Vec<u8>>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(ProtocolError::Io(e)),
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

/// Write one frame to a stream and flush it.
pub fn write_frame(writer: &mut impl Write, payload: &[u8]) -> Result<(), ProtocolError> {
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }

    // MAX_MESSAGE_SIZE fits in u32.
    let len = u32::try_from(payload.len())
        .map_err(|_| ProtocolError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_MESSAGE_SIZE,
        })?
        .to_le_bytes();
    writer.write_all(&len)?;
    writer.write_all(payload)?;
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
