//! Minimal echo server: accepts one peer and echoes messages back.
//!
//! Run with:
//!   cargo run --example echo-server
//!
//! In another terminal:
//!   cargo run --features cli -- send 127.0.0.1:9735 --data hello --wait

use peerwire::peer::PeerState;
use peerwire::transport::Listener;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:9735".to_string());

    let listener = Listener::bind(&addr)?;
    eprintln!("Listening on {}", listener.local_endpoint());

    let mut peer = PeerState::from_stream(listener.accept()?)?;
    eprintln!("Peer connected");

    loop {
        match peer.read() {
            Ok(msg) => {
                eprintln!("Received {} bytes", msg.len());
                peer.write_immediate_owned(msg)?;
            }
            Err(e) => {
                eprintln!("Peer gone: {e}");
                break;
            }
        }
    }

    Ok(())
}
