use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to any `Write` stream.
///
/// Header and payload go out from one buffer, and short writes are resumed
/// until every byte is on the stream. A frame is either written in full or
/// the call fails.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T> FrameWriter<T> {
    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Frame and send one payload (blocking).
    ///
    /// `Interrupted` is retried. `WouldBlock` is not: on a blocking socket it
    /// only shows up when a write timeout expired, and that is a failure.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        encode_frame(payload, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        // Large frames would otherwise pin their peak size for the writer's lifetime.
        if self.buf.capacity() > INITIAL_BUFFER_CAPACITY * 8 {
            self.buf = BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY);
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Update maximum payload size for subsequent frame encoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
