//! Length-prefixed message framing for peer streams.
//!
//! Every message travels as a 4-byte big-endian length followed by exactly
//! that many payload bytes. This crate only knows where one message ends and
//! the next begins; what the bytes mean belongs to the caller.
//!
//! No partial reads, no buffer management in user code.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, FrameConfig, DEFAULT_MAX_PAYLOAD, HEADER_SIZE, WIRE_LEN_LIMIT,
};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
