use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use peerwire_frame::{FrameReader, FrameWriter, DEFAULT_MAX_PAYLOAD};
use peerwire_transport::PeerStream;
use tracing::debug;

use crate::batching::{deferred_flush, FlushControl};
use crate::error::{ConnectionLost, LossCause, Result};
use crate::gate::{WarnOnce, FLUSH_OPTION_WARNING};
use crate::hook::{
    ConnectionLossHandler, Direction, IoRecorder, LogConnectionLoss, TracingRecorder,
};

/// Shared handle to an I/O recorder.
pub type RecorderHandle = Arc<dyn IoRecorder>;

/// Shared handle to a connection-loss handler.
pub type LossHandlerHandle = Arc<dyn ConnectionLossHandler>;

/// Per-connection settings.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    /// Largest message accepted in either direction.
    pub max_payload_size: usize,
    /// Read timeout applied to the stream. `None` blocks indefinitely.
    pub read_timeout: Option<Duration>,
    /// Write timeout applied to the stream. `None` blocks indefinitely.
    pub write_timeout: Option<Duration>,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[derive(Clone, Copy)]
enum Flush {
    Batched,
    Immediate,
}

/// State of one peer connection, and the blocking message I/O on it.
///
/// Owns two handles on the same socket: one for the read path, one for the
/// write path. Reads must be serialized among themselves, as must writes;
/// `&mut self` enforces that for a single owner.
///
/// Every I/O call either completes in full or returns [`ConnectionLost`].
/// The first failure is escalated to the [`ConnectionLossHandler`]; after
/// that the state is dead and every call fails without touching the socket.
pub struct PeerState<S> {
    id: Option<String>,
    reader: FrameReader<S>,
    writer: FrameWriter<S>,
    recorder: RecorderHandle,
    loss_handler: LossHandlerHandle,
    warn_gate: &'static WarnOnce,
    lost: bool,
}

impl PeerState<PeerStream> {
    /// Wrap a connected stream with default configuration.
    pub fn from_stream(stream: PeerStream) -> Result<Self> {
        Self::from_stream_with_config(stream, PeerConfig::default())
    }

    /// Wrap a connected stream, applying timeouts at the stream layer.
    pub fn from_stream_with_config(stream: PeerStream, config: PeerConfig) -> Result<Self> {
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        let reader_stream = stream.try_clone()?;

        debug!(
            transport = stream.transport_name(),
            remote = stream.peer_addr_string().as_deref().unwrap_or("-"),
            "peer connection ready"
        );

        Ok(Self::from_parts(reader_stream, stream).with_config(&config))
    }
}

impl<S: Read + Write + FlushControl> PeerState<S> {
    /// Build from separate read-side and write-side handles of one connection.
    pub fn from_parts(reader: S, writer: S) -> Self {
        Self {
            id: None,
            reader: FrameReader::new(reader),
            writer: FrameWriter::new(writer),
            recorder: Arc::new(TracingRecorder),
            loss_handler: Arc::new(LogConnectionLoss),
            warn_gate: &FLUSH_OPTION_WARNING,
            lost: false,
        }
    }

    /// Identity passed to the recorder and loss handler.
    pub fn with_peer_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_recorder(mut self, recorder: RecorderHandle) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn with_loss_handler(mut self, handler: LossHandlerHandle) -> Self {
        self.loss_handler = handler;
        self
    }

    /// Replace the process-wide gate for flush-option warnings.
    pub fn with_warn_gate(mut self, gate: &'static WarnOnce) -> Self {
        self.warn_gate = gate;
        self
    }

    /// Apply the payload limit from `config`. Timeouts only take effect
    /// through [`PeerState::from_stream_with_config`].
    pub fn with_config(mut self, config: &PeerConfig) -> Self {
        self.reader.set_max_payload_size(config.max_payload_size);
        self.writer.set_max_payload_size(config.max_payload_size);
        self
    }

    pub fn peer_id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Whether a previous call declared this connection lost.
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Send one message, taking ownership of it.
    ///
    /// The buffer is released once the call returns, whatever the outcome.
    pub fn write_owned<M: AsRef<[u8]>>(
        &mut self,
        msg: M,
    ) -> std::result::Result<(), ConnectionLost> {
        self.send(msg.as_ref(), Flush::Batched)
    }

    /// Send one message; the caller keeps the buffer.
    pub fn write_borrowed(&mut self, msg: &[u8]) -> std::result::Result<(), ConnectionLost> {
        self.send(msg, Flush::Batched)
    }

    /// Send one message, taking ownership, and push it onto the wire
    /// without waiting for kernel batching.
    pub fn write_immediate_owned<M: AsRef<[u8]>>(
        &mut self,
        msg: M,
    ) -> std::result::Result<(), ConnectionLost> {
        self.send(msg.as_ref(), Flush::Immediate)
    }

    /// Send one message without waiting for kernel batching; the caller
    /// keeps the buffer.
    pub fn write_immediate_borrowed(
        &mut self,
        msg: &[u8],
    ) -> std::result::Result<(), ConnectionLost> {
        self.send(msg, Flush::Immediate)
    }

    /// Read the next complete message (blocking).
    ///
    /// The returned bytes live in their own allocation, owned by the caller;
    /// holding on to a message never pins the reader's buffer. A stream that
    /// ends before a full message arrived is a lost connection, never a short
    /// message.
    pub fn read(&mut self) -> std::result::Result<Bytes, ConnectionLost> {
        self.ensure_live(Direction::In)?;

        match self.reader.read_frame() {
            Ok(frame) => {
                let msg = Bytes::copy_from_slice(&frame);
                self.recorder.record(Direction::In, self.id.as_deref(), &msg);
                Ok(msg)
            }
            Err(err) => Err(self.lose(Direction::In, LossCause::Frame(err))),
        }
    }

    fn send(&mut self, msg: &[u8], flush: Flush) -> std::result::Result<(), ConnectionLost> {
        self.ensure_live(Direction::Out)?;
        self.recorder.record(Direction::Out, self.id.as_deref(), msg);

        let sent = match flush {
            Flush::Batched => self.writer.send(msg),
            Flush::Immediate => deferred_flush(&mut self.writer, self.warn_gate, |w| w.send(msg)),
        };

        sent.map_err(|err| self.lose(Direction::Out, LossCause::Frame(err)))
    }

    fn ensure_live(&self, direction: Direction) -> std::result::Result<(), ConnectionLost> {
        if self.lost {
            return Err(ConnectionLost::new(direction, LossCause::AlreadyLost));
        }
        Ok(())
    }

    fn lose(&mut self, direction: Direction, cause: LossCause) -> ConnectionLost {
        let err = ConnectionLost::new(direction, cause);
        self.lost = true;
        self.loss_handler.connection_lost(self.id.as_deref(), &err);
        err
    }
}

impl<S> std::fmt::Debug for PeerState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerState")
            .field("id", &self.id)
            .field("lost", &self.lost)
            .finish_non_exhaustive()
    }
}
