//! Blocking peer-to-peer message transport.
//!
//! peerwire moves whole, already-serialized messages between two protocol
//! peers over TCP or Unix domain sockets, with per-message control over
//! kernel send batching and a single connection-lost outcome for every
//! transport failure.
//!
//! # Crate Structure
//!
//! - [`transport`]: Stream types, endpoints, and the platform flush option
//! - [`frame`]: Length-prefixed frame reading and writing
//! - [`peer`]: Message I/O on a peer connection

/// Re-export transport types.
pub mod transport {
    pub use peerwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use peerwire_frame::*;
}

/// Re-export peer types.
pub mod peer {
    pub use peerwire_peer::*;
}
