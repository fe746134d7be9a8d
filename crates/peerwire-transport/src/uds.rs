use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::PeerStream;

/// Unix domain socket transport.
///
/// For peers co-located on one host. The socket file is removed on drop,
/// unless something else has replaced it in the meantime.
pub struct UnixDomainSocket {
    listener: UnixListener,
    path: PathBuf,
    created_inode: (u64, u64),
}

impl UnixDomainSocket {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;
    /// `sockaddr_un.sun_path` is 108 bytes on Linux, 104 elsewhere.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind and listen on a filesystem-path Unix domain socket.
    ///
    /// A stale socket at `path` is removed first; any other kind of file is
    /// left alone and reported as a bind error.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let path_bytes = path.as_os_str().len();
        if path_bytes >= Self::MAX_PATH_LEN {
            return Err(TransportError::PathTooLong {
                path,
                len: path_bytes,
                max: Self::MAX_PATH_LEN,
            });
        }

        let bind_err = |source: std::io::Error| TransportError::Bind {
            addr: path.display().to_string(),
            source,
        };

        if let Ok(metadata) = std::fs::symlink_metadata(&path) {
            if !metadata.file_type().is_socket() {
                return Err(bind_err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "existing path is not a unix socket",
                )));
            }
            debug!(?path, "removing stale socket");
            std::fs::remove_file(&path).map_err(bind_err)?;
        }

        let listener = UnixListener::bind(&path).map_err(bind_err)?;
        std::fs::set_permissions(
            &path,
            std::fs::Permissions::from_mode(Self::DEFAULT_SOCKET_MODE),
        )
        .map_err(bind_err)?;
        let created = std::fs::symlink_metadata(&path).map_err(bind_err)?;

        info!(?path, "listening on unix domain socket");

        let created_inode = (created.dev(), created.ino());
        Ok(Self {
            listener,
            path,
            created_inode,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<PeerStream> {
        let (stream, _addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(path = ?self.path, "accepted unix connection");
        Ok(PeerStream::from(stream))
    }

    /// Connect to a listening Unix domain socket (blocking).
    pub fn connect(path: impl AsRef<Path>) -> Result<PeerStream> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|e| TransportError::Connect {
            addr: path.display().to_string(),
            source: e,
        })?;
        debug!(?path, "connected to unix domain socket");
        Ok(PeerStream::from(stream))
    }

    /// The path this socket is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for UnixDomainSocket {
    fn drop(&mut self) {
        let Ok(metadata) = std::fs::symlink_metadata(&self.path) else {
            return;
        };
        if metadata.file_type().is_socket() && (metadata.dev(), metadata.ino()) == self.created_inode
        {
            debug!(path = ?self.path, "cleaning up socket file");
            let _ = std::fs::remove_file(&self.path);
        } else {
            debug!(path = ?self.path, "socket path replaced; skipping cleanup");
        }
    }
}
