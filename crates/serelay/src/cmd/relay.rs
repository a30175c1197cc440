use serelay_record::ReaderConfig;
use serelay_relay::{relay, RelayConfig, SinkTarget, TransferSession};
use serelay_transport::SerialConfig;

use crate::cmd::{report_unknown, RelayArgs};
use crate::exit::{relay_error, CliResult, SUCCESS};
use crate::output::{print_summary, OutputFormat};

pub fn run(args: RelayArgs, format: Option<OutputFormat>) -> CliResult<i32> {
    report_unknown(&args.unknown);
    let serial = SerialConfig::new(&args.port).with_baud_rate(args.baud);
    let session = TransferSession::new(&args.input, SinkTarget::from(args.output));
    let config = RelayConfig {
        receiver: ReaderConfig {
            idle_limit: args.idle_limit,
            stop_drain: serial.read_timeout(),
        },
        ..RelayConfig::default()
    };

    tracing::info!(
        device = %serial.path.display(),
        source = %session.source.display(),
        sink = %session.sink,
        "starting relay"
    );
    let summary = relay(&serial, &session, config).map_err(|err| relay_error("relay failed", err))?;

    if let Some(format) = format {
        print_summary(&serial.path.display().to_string(), &session, &summary, format);
    }
    Ok(SUCCESS)
}
