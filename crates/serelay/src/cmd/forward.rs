use serelay_relay::{Forwarder, RelayError, Role};
use serelay_transport::{SerialConfig, SerialPort, StopSignal};

use crate::cmd::{report_unknown, ForwardArgs};
use crate::exit::{relay_error, CliError, CliResult, INTERNAL, SUCCESS};

pub fn run(args: ForwardArgs) -> CliResult<i32> {
    report_unknown(&args.unknown);
    let role = args.role();
    let serial = SerialConfig::new(&args.port).with_baud_rate(args.baud);
    let port = SerialPort::open(&serial)
        .map_err(|err| relay_error("device setup failed", RelayError::from(err)))?;
    let device = port.path().display().to_string();

    let forwarded = match role {
        Role::Server => {
            Forwarder::new().server(std::io::stdin().lock(), "<stdin>", port, &device)
        }
        Role::Client => {
            let mut forwarder = Forwarder::new();
            if args.follow {
                let stop = StopSignal::new();
                install_ctrlc_handler(stop.clone())?;
                forwarder = forwarder.follow(stop);
            }
            forwarder.client(port, &device, std::io::stdout().lock(), "<stdout>")
        }
    };
    let bytes = forwarded.map_err(|err| relay_error("forwarding failed", err))?;

    tracing::info!(?role, bytes, "forwarding finished");
    Ok(SUCCESS)
}

fn install_ctrlc_handler(stop: StopSignal) -> CliResult<()> {
    ctrlc::set_handler(move || stop.raise())
        .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
