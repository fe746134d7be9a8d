use peerwire_frame::FrameError;
use peerwire_transport::TransportError;

use crate::hook::Direction;

/// Why a connection was declared lost.
#[derive(Debug, thiserror::Error)]
pub enum LossCause {
    /// The stream failed, closed, or carried an unusable frame.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// An earlier call already lost this connection; no I/O was attempted.
    #[error("connection was already lost")]
    AlreadyLost,
}

/// The connection to the peer is gone.
///
/// This is the only failure the message I/O calls report. It is not
/// retryable at this layer: the caller is expected to stop handling the
/// peer and leave reconnection to whoever owns the connection.
#[must_use]
#[derive(Debug, thiserror::Error)]
#[error("connection lost ({direction}): {cause}")]
pub struct ConnectionLost {
    direction: Direction,
    #[source]
    cause: LossCause,
}

impl ConnectionLost {
    pub(crate) fn new(direction: Direction, cause: LossCause) -> Self {
        Self { direction, cause }
    }

    /// Whether the failure happened on the outbound or the inbound path.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn cause(&self) -> &LossCause {
        &self.cause
    }

    /// True when the peer closed the stream (EOF or a zero-length write).
    pub fn is_peer_closed(&self) -> bool {
        matches!(self.cause, LossCause::Frame(FrameError::ConnectionClosed))
    }

    /// True when a stream read or write timeout expired.
    pub fn timed_out(&self) -> bool {
        matches!(
            &self.cause,
            LossCause::Frame(FrameError::Io(err))
                if matches!(err.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
        )
    }
}

/// Errors that can occur while setting up a peer connection.
#[derive(Debug, thiserror::Error)]
pub enum PeerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, PeerError>;

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn classifies_causes() {
        let closed = ConnectionLost::new(Direction::In, FrameError::ConnectionClosed.into());
        assert!(closed.is_peer_closed());
        assert!(!closed.timed_out());

        let timeout = ConnectionLost::new(
            Direction::In,
            FrameError::Io(io::Error::from(io::ErrorKind::WouldBlock)).into(),
        );
        assert!(timeout.timed_out());
        assert!(!timeout.is_peer_closed());

        let again = ConnectionLost::new(Direction::Out, LossCause::AlreadyLost);
        assert!(!again.timed_out());
        assert_eq!(again.to_string(), "connection lost (out): connection was already lost");
    }
}
