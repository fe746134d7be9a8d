//! Collaborator seams: raw I/O recording and connection-loss escalation.

use std::fmt;

use tracing::{info, trace, warn};

use crate::error::ConnectionLost;

/// Direction of a message relative to this side of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives every message that crosses the connection, for diagnostics.
///
/// Called with the full message bytes: outbound before they are written,
/// inbound once a complete frame has arrived. Implementations must return
/// promptly and must not fail.
pub trait IoRecorder: Send + Sync {
    fn record(&self, direction: Direction, peer: Option<&str>, msg: &[u8]);
}

/// Emits one `trace` event per message, with a hex dump of the bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRecorder;

impl IoRecorder for TracingRecorder {
    fn record(&self, direction: Direction, peer: Option<&str>, msg: &[u8]) {
        trace!(
            direction = direction.as_str(),
            peer = peer.unwrap_or("-"),
            len = msg.len(),
            bytes = %hex::encode(msg),
            "peer io"
        );
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

impl IoRecorder for NoopRecorder {
    fn record(&self, _direction: Direction, _peer: Option<&str>, _msg: &[u8]) {}
}

/// The single place a transport failure is escalated to.
///
/// Invoked exactly once per connection, by the call that first detects the
/// loss. The failing call then returns [`ConnectionLost`] and the caller must
/// abandon the peer.
pub trait ConnectionLossHandler: Send + Sync {
    fn connection_lost(&self, peer: Option<&str>, err: &ConnectionLost);
}

/// Logs the loss: `info` when the peer simply closed, `warn` otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogConnectionLoss;

impl ConnectionLossHandler for LogConnectionLoss {
    fn connection_lost(&self, peer: Option<&str>, err: &ConnectionLost) {
        let peer = peer.unwrap_or("-");
        let direction = err.direction().as_str();
        if err.is_peer_closed() {
            info!(peer, direction, "peer closed connection");
        } else {
            warn!(peer, direction, error = %err, "peer connection lost");
        }
    }
}
