use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::sockopt::FlushOption;

/// A connected peer stream over TCP or a Unix domain socket.
///
/// This is the handle the connection-state owner holds. Everything above
/// this layer borrows it per call; it is never closed or duplicated there.
pub struct PeerStream {
    inner: PeerStreamInner,
}

enum PeerStreamInner {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for PeerStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            PeerStreamInner::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            PeerStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for PeerStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            PeerStreamInner::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            PeerStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            PeerStreamInner::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            PeerStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl From<TcpStream> for PeerStream {
    fn from(stream: TcpStream) -> Self {
        Self {
            inner: PeerStreamInner::Tcp(stream),
        }
    }
}

#[cfg(unix)]
impl From<std::os::unix::net::UnixStream> for PeerStream {
    fn from(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: PeerStreamInner::Unix(stream),
        }
    }
}

impl PeerStream {
    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            PeerStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            PeerStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            PeerStreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            PeerStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    ///
    /// Used to give the reading and the writing path their own handle on the
    /// same socket.
    pub fn try_clone(&self) -> Result<Self> {
        let inner = match &self.inner {
            PeerStreamInner::Tcp(stream) => PeerStreamInner::Tcp(stream.try_clone()?),
            #[cfg(unix)]
            PeerStreamInner::Unix(stream) => PeerStreamInner::Unix(stream.try_clone()?),
        };
        Ok(Self { inner })
    }

    /// Toggle the platform flush option (see [`FlushOption::PLATFORM`]).
    ///
    /// Unix domain sockets have no TCP level; the OS error is returned as is.
    pub fn set_flush_option(&self, enabled: bool) -> Result<()> {
        let option = FlushOption::PLATFORM;
        self.set_flush_option_raw(option, enabled)
            .map_err(|source| TransportError::SocketOption {
                option: option.name(),
                source,
            })
    }

    #[cfg(unix)]
    fn set_flush_option_raw(&self, option: FlushOption, enabled: bool) -> std::io::Result<()> {
        use std::os::fd::AsRawFd;

        crate::sockopt::set_tcp_option(self.as_raw_fd(), option, enabled)
    }

    #[cfg(not(unix))]
    fn set_flush_option_raw(&self, _option: FlushOption, enabled: bool) -> std::io::Result<()> {
        match &self.inner {
            PeerStreamInner::Tcp(stream) => stream.set_nodelay(enabled),
        }
    }

    /// Remote address for diagnostics, or `None` if it cannot be resolved.
    pub fn peer_addr_string(&self) -> Option<String> {
        match &self.inner {
            PeerStreamInner::Tcp(stream) => stream.peer_addr().ok().map(|a| a.to_string()),
            #[cfg(unix)]
            PeerStreamInner::Unix(stream) => stream
                .peer_addr()
                .ok()
                .and_then(|a| a.as_pathname().map(|p| p.display().to_string())),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            PeerStreamInner::Tcp(_) => "tcp",
            #[cfg(unix)]
            PeerStreamInner::Unix(_) => "unix-domain-socket",
        }
    }
}

#[cfg(unix)]
impl std::os::fd::AsRawFd for PeerStream {
    fn as_raw_fd(&self) -> std::os::fd::RawFd {
        match &self.inner {
            PeerStreamInner::Tcp(stream) => stream.as_raw_fd(),
            PeerStreamInner::Unix(stream) => stream.as_raw_fd(),
        }
    }
}

impl std::fmt::Debug for PeerStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerStream")
            .field("type", &self.transport_name())
            .finish()
    }
}
