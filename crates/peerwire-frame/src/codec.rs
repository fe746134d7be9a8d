use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: big-endian payload length.
pub const HEADER_SIZE: usize = 4;

/// Declared lengths at or above this are never valid on the wire (16 MiB).
pub const WIRE_LEN_LIMIT: usize = 1 << 24;

/// Default maximum payload size: the largest length the wire allows.
pub const DEFAULT_MAX_PAYLOAD: usize = WIRE_LEN_LIMIT - 1;

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────────┬───────────────────┐
/// │ Length      │ Payload           │
/// │ (4B BE)     │ (Length bytes)    │
/// └─────────────┴───────────────────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() >= WIRE_LEN_LIMIT {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: DEFAULT_MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_u32(payload.len() as u32);
    dst.put_slice(payload);
    Ok(())
}

/// Decode one frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. The length check
/// runs as soon as the header is in, so an oversized frame is refused
/// before any of its payload is buffered.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&src[..HEADER_SIZE]);
    let payload_len = u32::from_be_bytes(header) as usize;

    let max = max_payload.min(DEFAULT_MAX_PAYLOAD);
    if payload_len > max {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max,
        });
    }

    if src.len() < HEADER_SIZE + payload_len {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    Ok(Some(src.split_to(payload_len).freeze()))
}

/// Configuration for frame reading and writing.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Capped at [`DEFAULT_MAX_PAYLOAD`].
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
