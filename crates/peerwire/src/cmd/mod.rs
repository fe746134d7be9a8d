use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Args, Subcommand};
use peerwire_peer::{PeerConfig, PeerState};
use peerwire_transport::PeerStream;

use crate::exit::{peer_error, CliError, CliResult, INTERNAL};
use crate::output::OutputFormat;

pub mod echo;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Accept peers and echo every message back.
    Echo(EchoArgs),
    /// Send a single message.
    Send(SendArgs),
    /// Accept peers and print received messages.
    Listen(ListenArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Echo(args) => echo::run(args),
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Address to bind: host:port, or a socket path.
    #[arg(env = "PEERWIRE_ADDR")]
    pub addr: String,
    /// Flush each echoed message immediately instead of letting the kernel batch.
    #[arg(long)]
    pub immediate: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Address to connect to: host:port, or a socket path.
    #[arg(env = "PEERWIRE_ADDR")]
    pub addr: String,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["hex", "file"])]
    pub data: Option<String>,
    /// Hex-encoded payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
    /// Flush the message immediately instead of letting the kernel batch.
    #[arg(long)]
    pub immediate: bool,
    /// Wait for one reply message and print it.
    #[arg(long)]
    pub wait: bool,
    /// Give up waiting for the reply after this long (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Address to bind: host:port, or a socket path.
    #[arg(env = "PEERWIRE_ADDR")]
    pub addr: String,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Wrap an accepted or connected stream for message I/O.
pub(crate) fn open_peer(
    stream: PeerStream,
    id: String,
    config: PeerConfig,
) -> CliResult<PeerState<PeerStream>> {
    let peer = PeerState::from_stream_with_config(stream, config)
        .map_err(|err| peer_error("peer setup failed", err))?;
    Ok(peer.with_peer_id(id))
}

pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
