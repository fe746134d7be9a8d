//! Blocking message I/O between two protocol peers.
//!
//! This is the layer application code talks to. It sends and receives
//! whole, already-serialized messages over a peer connection, lets the
//! caller ask for a message to skip kernel send batching, and turns every
//! transport failure into one outcome: [`ConnectionLost`].
//!
//! - [`PeerState::write_owned`] / [`PeerState::write_borrowed`] send a message.
//! - [`PeerState::write_immediate_owned`] / [`PeerState::write_immediate_borrowed`]
//!   send a message and flush it out right away.
//! - [`PeerState::read`] receives the next message.
//!
//! Nothing here retries or reconnects. A lost connection stays lost.

pub mod batching;
pub mod error;
pub mod gate;
pub mod hook;
pub mod peer;

pub use batching::{deferred_flush, FlushControl, FlushGuard};
pub use error::{ConnectionLost, LossCause, PeerError, Result};
pub use gate::{WarnOnce, FLUSH_OPTION_WARNING};
pub use hook::{
    ConnectionLossHandler, Direction, IoRecorder, LogConnectionLoss, NoopRecorder, TracingRecorder,
};
pub use peer::{LossHandlerHandle, PeerConfig, PeerState, RecorderHandle};
