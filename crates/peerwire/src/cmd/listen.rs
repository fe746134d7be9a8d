use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use peerwire_peer::PeerConfig;
use peerwire_transport::Listener;
use tracing::info;

use crate::cmd::{install_ctrlc_handler, open_peer, ListenArgs};
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let listener = Listener::bind(&args.addr).map_err(|err| transport_error("bind failed", err))?;
    info!(endpoint = %listener.local_endpoint(), "listening");

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let stream = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        let remote = stream
            .peer_addr_string()
            .unwrap_or_else(|| listener.local_endpoint().to_string());
        let mut peer = open_peer(stream, remote.clone(), PeerConfig::default())?;

        while running.load(Ordering::SeqCst) {
            // A lost peer has already been logged by the loss handler.
            let Ok(msg) = peer.read() else { break };

            print_message(&msg, &remote, format);
            printed = printed.saturating_add(1);

            if args.count.is_some_and(|count| printed >= count) {
                return Ok(SUCCESS);
            }
        }
    }

    Ok(SUCCESS)
}
