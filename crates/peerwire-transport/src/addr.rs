use std::path::PathBuf;

use crate::error::{Result, TransportError};
use crate::tcp::TcpTransport;
use crate::traits::PeerStream;

#[cfg(unix)]
use crate::uds::UnixDomainSocket;

/// Where a peer lives.
///
/// Parsed from a plain string: anything containing a `/` is a Unix socket
/// path, everything else is a TCP `host:port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Tcp(String),
    Unix(PathBuf),
}

impl Endpoint {
    pub fn parse(addr: &str) -> Result<Self> {
        let addr = addr.trim();
        if addr.is_empty() {
            return Err(TransportError::InvalidAddress {
                addr: addr.to_string(),
                reason: "address must not be empty",
            });
        }

        if addr.contains('/') {
            if cfg!(unix) {
                return Ok(Endpoint::Unix(PathBuf::from(addr)));
            }
            return Err(TransportError::InvalidAddress {
                addr: addr.to_string(),
                reason: "unix socket paths are not supported on this platform",
            });
        }

        if !addr.contains(':') {
            return Err(TransportError::InvalidAddress {
                addr: addr.to_string(),
                reason: "expected host:port or a socket path",
            });
        }

        Ok(Endpoint::Tcp(addr.to_string()))
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Tcp(addr) => f.write_str(addr),
            Endpoint::Unix(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Connect to a peer at `addr` (blocking).
pub fn connect(addr: &str) -> Result<PeerStream> {
    match Endpoint::parse(addr)? {
        Endpoint::Tcp(addr) => TcpTransport::connect(&addr),
        #[cfg(unix)]
        Endpoint::Unix(path) => UnixDomainSocket::connect(path),
        #[cfg(not(unix))]
        Endpoint::Unix(_) => unreachable!("unix endpoints are rejected at parse time"),
    }
}

/// A bound listener for either endpoint kind.
pub enum Listener {
    Tcp(TcpTransport),
    #[cfg(unix)]
    Unix(UnixDomainSocket),
}

impl Listener {
    /// Bind to `addr` (see [`Endpoint::parse`]).
    pub fn bind(addr: &str) -> Result<Self> {
        match Endpoint::parse(addr)? {
            Endpoint::Tcp(addr) => Ok(Listener::Tcp(TcpTransport::bind(&addr)?)),
            #[cfg(unix)]
            Endpoint::Unix(path) => Ok(Listener::Unix(UnixDomainSocket::bind(path)?)),
            #[cfg(not(unix))]
            Endpoint::Unix(_) => unreachable!("unix endpoints are rejected at parse time"),
        }
    }

    /// Accept the next incoming connection (blocking).
    pub fn accept(&self) -> Result<PeerStream> {
        match self {
            Listener::Tcp(listener) => listener.accept(),
            #[cfg(unix)]
            Listener::Unix(listener) => listener.accept(),
        }
    }

    /// The bound endpoint, with the actual port for TCP.
    pub fn local_endpoint(&self) -> Endpoint {
        match self {
            Listener::Tcp(listener) => Endpoint::Tcp(listener.local_addr().to_string()),
            #[cfg(unix)]
            Listener::Unix(listener) => Endpoint::Unix(listener.path().to_path_buf()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn parse_tcp() {
        assert_eq!(
            Endpoint::parse("127.0.0.1:9735").unwrap(),
            Endpoint::Tcp("127.0.0.1:9735".to_string())
        );
        assert_eq!(
            Endpoint::parse(" localhost:1 ").unwrap(),
            Endpoint::Tcp("localhost:1".to_string())
        );
    }

    #[test]
    #[cfg(unix)]
    fn parse_unix_path() {
        assert_eq!(
            Endpoint::parse("/tmp/peer.sock").unwrap(),
            Endpoint::Unix(PathBuf::from("/tmp/peer.sock"))
        );
        assert_eq!(
            Endpoint::parse("./peer.sock").unwrap(),
            Endpoint::Unix(PathBuf::from("./peer.sock"))
        );
    }

    #[test]
    fn parse_rejects_empty_and_portless() {
        assert!(matches!(
            Endpoint::parse(""),
            Err(TransportError::InvalidAddress { .. })
        ));
        assert!(matches!(
            Endpoint::parse("localhost"),
            Err(TransportError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn listener_roundtrip_tcp() {
        let listener = Listener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_endpoint().to_string();

        let handle = std::thread::spawn(move || {
            let mut client = connect(&addr).unwrap();
            client.write_all(b"hi").unwrap();
        });

        let mut server = listener.accept().unwrap();
        let mut buf = [0u8; 2];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hi");
        handle.join().unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn listener_roundtrip_unix() {
        let dir = std::env::temp_dir().join(format!("peerwire-addr-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let sock = dir.join("l.sock").display().to_string();

        let listener = Listener::bind(&sock).unwrap();
        let sock_clone = sock.clone();
        let handle = std::thread::spawn(move || {
            let mut client = connect(&sock_clone).unwrap();
            client.write_all(b"yo").unwrap();
        });

        let mut server = listener.accept().unwrap();
        let mut buf = [0u8; 2];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"yo");
        handle.join().unwrap();

        assert_eq!(listener.local_endpoint(), Endpoint::Unix(PathBuf::from(&sock)));
        drop(listener);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
