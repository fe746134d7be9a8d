//! Blocking stream transport between two protocol peers.
//!
//! Provides a single stream type over the socket families a peer connection
//! can run on:
//! - TCP (all platforms)
//! - Unix domain sockets (Linux/macOS)
//!
//! This is the lowest layer of peerwire. It also owns the platform branch
//! for the kernel send-coalescing knob (see [`sockopt`]), so that higher
//! layers only ever ask for "flush immediately" without knowing which
//! socket option that maps to.

pub mod addr;
pub mod error;
pub mod sockopt;
pub mod tcp;
pub mod traits;

#[cfg(unix)]
pub mod uds;

pub use addr::{connect, Endpoint, Listener};
pub use error::{Result, TransportError};
pub use sockopt::FlushOption;
pub use tcp::TcpTransport;
pub use traits::PeerStream;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
