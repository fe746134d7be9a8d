use std::path::PathBuf;

/// Errors that can occur in peer transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to connect to the specified address.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// Failed to accept an incoming connection.
    #[error("failed to accept connection: {0}")]
    Accept(std::io::Error),

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },

    /// The address string could not be interpreted as an endpoint.
    #[error("invalid address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: &'static str },

    /// Setting a socket option failed.
    #[error("setsockopt {option}: {source}")]
    SocketOption {
        option: &'static str,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;
