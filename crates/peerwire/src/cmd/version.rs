use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("peerwire {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: peerwire");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("PEERWIRE_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("PEERWIRE_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "flush_option: {}",
        peerwire_transport::FlushOption::PLATFORM.name()
    );
    println!("max_payload: {}", peerwire_frame::DEFAULT_MAX_PAYLOAD);

    Ok(SUCCESS)
}
