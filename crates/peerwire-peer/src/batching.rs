//! Immediate-flush control around a single write.
//!
//! Gossip and other bulk traffic is fine to leave to kernel batching, but
//! some messages (a commitment, for example) should go out right away. The
//! platform flush option (see [`FlushOption::PLATFORM`]) is switched on for
//! the duration of one write and switched back off afterwards.

use std::ops::{Deref, DerefMut};

use peerwire_frame::FrameWriter;
use peerwire_transport::{FlushOption, PeerStream, TransportError};
use tracing::warn;

use crate::gate::WarnOnce;

/// A stream whose kernel send coalescing can be overridden.
pub trait FlushControl {
    /// Switch the platform flush option on or off.
    fn set_immediate_flush(&self, enabled: bool) -> std::io::Result<()>;

    /// Name of the socket option behind [`set_immediate_flush`](Self::set_immediate_flush).
    fn flush_option_name(&self) -> &'static str {
        FlushOption::PLATFORM.name()
    }
}

impl FlushControl for PeerStream {
    fn set_immediate_flush(&self, enabled: bool) -> std::io::Result<()> {
        self.set_flush_option(enabled).map_err(|err| match err {
            TransportError::SocketOption { source, .. } | TransportError::Io(source) => source,
            other => std::io::Error::other(other.to_string()),
        })
    }
}

impl<T: FlushControl> FlushControl for FrameWriter<T> {
    fn set_immediate_flush(&self, enabled: bool) -> std::io::Result<()> {
        self.get_ref().set_immediate_flush(enabled)
    }

    fn flush_option_name(&self) -> &'static str {
        self.get_ref().flush_option_name()
    }
}

/// Holds the flush option on; clears it again when dropped.
///
/// Failing to set the option is reported through `gate` (so at most once per
/// gate) and otherwise ignored: the write still happens, just with default
/// batching. Failing to clear it is ignored entirely.
pub struct FlushGuard<'a, S: FlushControl> {
    stream: &'a mut S,
}

impl<'a, S: FlushControl> FlushGuard<'a, S> {
    pub fn engage(stream: &'a mut S, gate: &WarnOnce) -> Self {
        if let Err(err) = stream.set_immediate_flush(true) {
            let option = stream.flush_option_name();
            gate.warn(|| warn!(option, error = %err, "setsockopt {option}=1 failed"));
        }
        Self { stream }
    }
}

impl<S: FlushControl> Deref for FlushGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.stream
    }
}

impl<S: FlushControl> DerefMut for FlushGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.stream
    }
}

impl<S: FlushControl> Drop for FlushGuard<'_, S> {
    fn drop(&mut self) {
        let _ = self.stream.set_immediate_flush(false);
    }
}

/// Run `body` with the flush option held on `stream`.
///
/// The option is cleared on every exit path, including an error or a panic
/// inside `body`.
pub fn deferred_flush<S: FlushControl, R>(
    stream: &mut S,
    gate: &WarnOnce,
    body: impl FnOnce(&mut S) -> R,
) -> R {
    let mut guard = FlushGuard::engage(stream, gate);
    body(&mut guard)
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default, Clone)]
    struct Knob {
        calls: Arc<Mutex<Vec<bool>>>,
        refuse: bool,
    }

    impl FlushControl for Knob {
        fn set_immediate_flush(&self, enabled: bool) -> std::io::Result<()> {
            self.calls.lock().unwrap().push(enabled);
            if self.refuse {
                return Err(std::io::Error::from(std::io::ErrorKind::Unsupported));
            }
            Ok(())
        }

        fn flush_option_name(&self) -> &'static str {
            "TEST_KNOB"
        }
    }

    #[test]
    fn option_set_around_body() {
        let mut knob = Knob::default();
        let calls = Arc::clone(&knob.calls);
        let gate = WarnOnce::new();

        let seen_inside = deferred_flush(&mut knob, &gate, |k| k.calls.lock().unwrap().clone());

        assert_eq!(seen_inside, vec![true]);
        assert_eq!(*calls.lock().unwrap(), vec![true, false]);
        assert!(!gate.has_fired());
    }

    #[test]
    fn option_cleared_when_body_fails() {
        let mut knob = Knob::default();
        let calls = Arc::clone(&knob.calls);
        let gate = WarnOnce::new();

        let result: Result<(), &str> = deferred_flush(&mut knob, &gate, |_| Err("write failed"));

        assert!(result.is_err());
        assert_eq!(*calls.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn option_cleared_when_body_panics() {
        let knob = Knob::default();
        let calls = Arc::clone(&knob.calls);

        let outcome = std::panic::catch_unwind(move || {
            let mut knob = knob;
            let gate = WarnOnce::new();
            deferred_flush(&mut knob, &gate, |_| panic!("boom"));
        });

        assert!(outcome.is_err());
        assert_eq!(*calls.lock().unwrap(), vec![true, false]);
    }

    #[test]
    fn refused_option_still_runs_body_and_trips_gate() {
        let mut knob = Knob {
            refuse: true,
            ..Knob::default()
        };
        let gate = WarnOnce::new();

        let ran = deferred_flush(&mut knob, &gate, |_| true);

        assert!(ran);
        assert!(gate.has_fired());
        assert_eq!(*knob.calls.lock().unwrap(), vec![true, false]);
    }

    impl Write for Knob {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn frame_writer_forwards_to_inner_stream() {
        let knob = Knob::default();
        let calls = Arc::clone(&knob.calls);
        let mut writer = FrameWriter::new(knob);
        let gate = WarnOnce::new();

        assert_eq!(writer.flush_option_name(), "TEST_KNOB");
        deferred_flush(&mut writer, &gate, |w| w.send(b"framed")).unwrap();

        assert_eq!(*calls.lock().unwrap(), vec![true, false]);
        assert!(!gate.has_fired());
    }

    #[test]
    #[cfg(unix)]
    fn real_tcp_stream_toggles() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let client = std::net::TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (mut server, _) = listener.accept().unwrap();
        let mut stream = PeerStream::from(client);
        let gate = WarnOnce::new();

        deferred_flush(&mut stream, &gate, |s| s.write_all(b"now")).unwrap();

        let mut buf = [0u8; 3];
        server.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"now");
        assert!(!gate.has_fired(), "tcp accepts the flush option");
    }

    #[test]
    #[cfg(unix)]
    fn unix_stream_refuses_but_still_writes() {
        let (left, mut right) = std::os::unix::net::UnixStream::pair().unwrap();
        let mut stream = PeerStream::from(left);
        let gate = WarnOnce::new();

        deferred_flush(&mut stream, &gate, |s| s.write_all(b"ok")).unwrap();

        let mut buf = [0u8; 2];
        right.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ok");
        assert!(gate.has_fired());
    }
}
