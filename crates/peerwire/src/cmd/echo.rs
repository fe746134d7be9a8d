use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use peerwire_peer::{ConnectionLost, PeerConfig, PeerState};
use peerwire_transport::{Listener, PeerStream};
use tracing::info;

use crate::cmd::{install_ctrlc_handler, open_peer, EchoArgs};
use crate::exit::{transport_error, CliResult, SUCCESS};

pub fn run(args: EchoArgs) -> CliResult<i32> {
    let listener = Listener::bind(&args.addr).map_err(|err| transport_error("bind failed", err))?;
    info!(
        endpoint = %listener.local_endpoint(),
        immediate = args.immediate,
        "echo server listening"
    );

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    while running.load(Ordering::SeqCst) {
        let stream = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        let remote = stream
            .peer_addr_string()
            .unwrap_or_else(|| listener.local_endpoint().to_string());
        let mut peer = open_peer(stream, remote, PeerConfig::default())?;

        while running.load(Ordering::SeqCst) {
            if echo_one(&mut peer, args.immediate).is_err() {
                break;
            }
        }
    }

    Ok(SUCCESS)
}

/// Read one message and send it straight back.
fn echo_one(peer: &mut PeerState<PeerStream>, immediate: bool) -> Result<(), ConnectionLost> {
    let msg = peer.read()?;
    info!(size = msg.len(), "echoing message");
    if immediate {
        peer.write_immediate_owned(msg)
    } else {
        peer.write_owned(msg)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::net::UnixStream;

    use super::*;

    #[test]
    fn echoes_until_peer_leaves() {
        let (server, client) = UnixStream::pair().unwrap();
        let mut server = PeerState::from_stream(PeerStream::from(server)).unwrap();
        let mut client = PeerState::from_stream(PeerStream::from(client)).unwrap();

        client.write_borrowed(b"first").unwrap();
        echo_one(&mut server, false).unwrap();
        assert_eq!(client.read().unwrap().as_ref(), b"first");

        client.write_borrowed(b"second").unwrap();
        echo_one(&mut server, true).unwrap();
        assert_eq!(client.read().unwrap().as_ref(), b"second");

        drop(client);
        let err = echo_one(&mut server, false).unwrap_err();
        assert!(err.is_peer_closed());
        assert!(server.is_lost());
    }
}
