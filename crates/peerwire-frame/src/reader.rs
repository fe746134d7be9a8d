use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::codec::{decode_frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Partial reads are handled internally; callers always get complete frames.
/// Bytes read past the end of one frame are kept for the next call.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T> FrameReader<T> {
    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached, whether
    /// cleanly between frames or partway through one.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            if let Some(payload) = decode_frame(&mut self.buf, self.config.max_payload_size)? {
                return Ok(payload);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if !self.buf.is_empty() {
                    debug!(buffered = self.buf.len(), "stream closed mid-frame");
                }
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Update maximum payload size for subsequent frame decoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::codec::encode_frame;

    fn wire(payloads: &[&[u8]]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for payload in payloads {
            encode_frame(payload, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    #[test]
    fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[b"hello"])));
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"hello");
    }

    #[test]
    fn read_frames_in_stream_order() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[b"one", b"two", b"three"])));

        assert_eq!(reader.read_frame().unwrap().as_ref(), b"one");
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"two");
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"three");
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn read_empty_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[b""])));
        assert!(reader.read_frame().unwrap().is_empty());
    }

    #[test]
    fn read_frame_larger_than_chunk() {
        let payload = vec![0xAB; 200 * 1024];
        let mut reader = FrameReader::new(Cursor::new(wire(&[payload.as_slice()])));
        assert_eq!(reader.read_frame().unwrap().as_ref(), payload.as_slice());
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: wire(&[b"slow"]),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"slow");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_header() {
        let mut reader = FrameReader::new(Cursor::new(vec![0x00, 0x00]));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_payload() {
        let mut partial = BytesMut::new();
        partial.put_u32(16);
        partial.put_slice(b"only-part");

        let mut reader = FrameReader::new(Cursor::new(partial.to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn oversized_frame_in_stream() {
        let mut header = BytesMut::new();
        header.put_u32(1024);

        let cfg = FrameConfig {
            max_payload_size: 16,
        };
        let mut reader = FrameReader::with_config(Cursor::new(header.to_vec()), cfg);
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
    }

    #[test]
    fn io_error_propagates() {
        let reader = FailingReader(ErrorKind::ConnectionReset);
        let mut framed = FrameReader::new(reader);
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::ConnectionReset));
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            interrupted: false,
            inner: Cursor::new(wire(&[b"ok"])),
        };
        let mut framed = FrameReader::new(reader);
        assert_eq!(framed.read_frame().unwrap().as_ref(), b"ok");
    }

    #[test]
    #[cfg(unix)]
    fn roundtrip_over_socket_pair() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut writer = crate::writer::FrameWriter::new(left);
        let mut reader = FrameReader::new(right);

        writer.send(b"ping").unwrap();
        writer.send(b"pong").unwrap();

        assert_eq!(reader.read_frame().unwrap().as_ref(), b"ping");
        assert_eq!(reader.read_frame().unwrap().as_ref(), b"pong");
    }

    #[test]
    #[cfg(unix)]
    fn peer_drop_is_connection_closed() {
        let (left, right) = std::os::unix::net::UnixStream::pair().unwrap();
        drop(left);

        let mut reader = FrameReader::new(right);
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn max_payload_can_be_tightened() {
        let mut reader = FrameReader::new(Cursor::new(wire(&[b"12345"])));
        reader.set_max_payload_size(4);
        assert_eq!(reader.config().max_payload_size, 4);
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::PayloadTooLarge { size: 5, max: 4 })
        ));
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct FailingReader(ErrorKind);

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(self.0))
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }
}
