use std::fs;
use std::time::Duration;

use peerwire_frame::DEFAULT_MAX_PAYLOAD;
use peerwire_peer::PeerConfig;

use crate::cmd::{open_peer, SendArgs};
use crate::exit::{
    connection_lost, transport_error, CliError, CliResult, DATA_INVALID, SUCCESS, TIMEOUT, USAGE,
};
use crate::output::{print_message, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    if payload.len() > DEFAULT_MAX_PAYLOAD {
        return Err(CliError::new(
            DATA_INVALID,
            format!(
                "payload is {} bytes, limit is {DEFAULT_MAX_PAYLOAD}",
                payload.len()
            ),
        ));
    }

    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let config = PeerConfig {
        read_timeout: Some(wait_timeout),
        write_timeout: Some(wait_timeout),
        ..PeerConfig::default()
    };

    let stream = peerwire_transport::connect(&args.addr)
        .map_err(|err| transport_error("connect failed", err))?;
    let mut peer = open_peer(stream, args.addr.clone(), config)?;

    let sent = if args.immediate {
        peer.write_immediate_owned(payload)
    } else {
        peer.write_owned(payload)
    };
    sent.map_err(|err| connection_lost("send failed", err))?;

    if args.wait {
        let reply = peer.read().map_err(|err| {
            if err.timed_out() {
                CliError::new(TIMEOUT, format!("no reply within {}", args.wait_timeout))
            } else {
                connection_lost("receive failed", err)
            }
        })?;
        print_message(&reply, &args.addr, format);
    }

    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex);
    }
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path).map_err(|err| {
            crate::exit::io_error(&format!("failed reading {}", path.display()), err)
        });
    }
    Ok(Vec::new())
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input.split_whitespace().collect();
    hex::decode(&digits)
        .map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")))
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
