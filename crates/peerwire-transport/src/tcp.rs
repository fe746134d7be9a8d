use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::PeerStream;

/// TCP transport.
///
/// Provides bind/accept/connect over TCP for peers reachable on the network.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on a TCP address (`host:port`, port 0 picks one).
    pub fn bind(addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr).map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;
        let local_addr = listener.local_addr().map_err(|e| TransportError::Bind {
            addr: addr.to_string(),
            source: e,
        })?;

        info!(%local_addr, "listening on tcp");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<PeerStream> {
        let (stream, remote) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%remote, "accepted tcp connection");
        Ok(PeerStream::from(stream))
    }

    /// Connect to a listening TCP peer (blocking).
    pub fn connect(addr: &str) -> Result<PeerStream> {
        let resolved: Vec<SocketAddr> = addr
            .to_socket_addrs()
            .map_err(|e| TransportError::Connect {
                addr: addr.to_string(),
                source: e,
            })?
            .collect();

        let stream =
            TcpStream::connect(resolved.as_slice()).map_err(|e| TransportError::Connect {
                addr: addr.to_string(),
                source: e,
            })?;
        debug!(addr, "connected over tcp");
        Ok(PeerStream::from(stream))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use super::*;

    #[test]
    fn bind_accept_connect() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();

        let handle = std::thread::spawn(move || {
            let mut client = TcpTransport::connect(&addr).unwrap();
            client.write_all(b"hello").unwrap();
        });

        let mut server = listener.accept().unwrap();
        let mut buf = [0u8; 5];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");

        handle.join().unwrap();
    }

    #[test]
    fn connect_refused() {
        let listener = TcpTransport::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().to_string();
        drop(listener);

        let result = TcpTransport::connect(&addr);
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }

    #[test]
    fn bind_rejects_garbage() {
        let result = TcpTransport::bind("not-an-address");
        assert!(matches!(result, Err(TransportError::Bind { .. })));
    }
}
