//! Kernel send-coalescing control.
//!
//! Bulk traffic is left to the kernel to batch, but some messages have to hit
//! the wire right away. There is no portable "flush now and keep batching"
//! call, so the nearest TCP-level option is picked at build time:
//!
//! - `TCP_CORK` where it exists (Linux, Android). Corking before the write and
//!   uncorking after it pushes the pending segment out on uncork.
//! - `TCP_NODELAY` everywhere else, where `Cork` does not exist. Setting it before the write flushes any
//!   batched data along with this message; clearing it afterwards restores
//!   Nagle batching. Worst case this costs one extra packet.

/// The TCP-level option used to request an immediate flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOption {
    /// `TCP_CORK`: defer sends until the option is cleared.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    Cork,
    /// `TCP_NODELAY`: disable Nagle coalescing.
    NoDelay,
}

impl FlushOption {
    /// The option selected for the target platform.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub const PLATFORM: FlushOption = FlushOption::Cork;

    /// The option selected for the target platform.
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    pub const PLATFORM: FlushOption = FlushOption::NoDelay;

    /// Socket option name, for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            #[cfg(any(target_os = "linux", target_os = "android"))]
            FlushOption::Cork => "TCP_CORK",
            FlushOption::NoDelay => "TCP_NODELAY",
        }
    }

    #[cfg(unix)]
    fn raw(self) -> libc::c_int {
        match self {
            #[cfg(any(target_os = "linux", target_os = "android"))]
            FlushOption::Cork => libc::TCP_CORK,
            FlushOption::NoDelay => libc::TCP_NODELAY,
        }
    }
}

impl std::fmt::Display for FlushOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Set an integer boolean option at `IPPROTO_TCP` level on a raw socket.
#[cfg(unix)]
pub fn set_tcp_option(
    fd: std::os::fd::RawFd,
    option: FlushOption,
    enabled: bool,
) -> std::io::Result<()> {
    let val: libc::c_int = i32::from(enabled);

    // SAFETY: `val` is a valid readable c_int for the given length, and `fd`
    // is a socket descriptor borrowed from a live stream for this call.
    let rc = unsafe {
        libc::setsockopt(
            fd,
            libc::IPPROTO_TCP,
            option.raw(),
            (&val as *const libc::c_int).cast::<libc::c_void>(),
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };

    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

/// Read back an integer boolean option at `IPPROTO_TCP` level.
#[cfg(unix)]
pub fn get_tcp_option(fd: std::os::fd::RawFd, option: FlushOption) -> std::io::Result<bool> {
    let mut val: libc::c_int = 0;
    let mut len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;

    // SAFETY: `val` and `len` are valid writable pointers for the provided
    // sizes, and `fd` is a socket descriptor borrowed from a live stream.
    let rc = unsafe {
        libc::getsockopt(
            fd,
            libc::IPPROTO_TCP,
            option.raw(),
            (&mut val as *mut libc::c_int).cast::<libc::c_void>(),
            &mut len,
        )
    };

    if rc == 0 {
        Ok(val != 0)
    } else {
        Err(std::io::Error::last_os_error())
    }
}
