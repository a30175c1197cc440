use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("serelay {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: serelay");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("SERELAY_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("SERELAY_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!(
        "defaults: port={} baud={} input={}",
        serelay_transport::DEFAULT_DEVICE,
        serelay_transport::DEFAULT_BAUD_RATE,
        crate::cmd::DEFAULT_INPUT
    );
    println!(
        "relay: chunk={} delay_per_byte_ms={}",
        serelay_relay::CHUNK_SIZE,
        serelay_relay::TRANSIT_DELAY_PER_BYTE.as_millis()
    );

    Ok(SUCCESS)
}
