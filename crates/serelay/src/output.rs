use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serelay_relay::{RelaySummary, TransferSession};

/// Rendering of the run summary. Always written to stderr.
#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

#[derive(Serialize)]
struct SummaryOutput {
    device: String,
    source: String,
    sink: String,
    bytes_sent: u64,
    chunks: u64,
    transit_delay_ms: u64,
    records_received: u64,
    bytes_received: u64,
}

impl SummaryOutput {
    fn new(device: &str, session: &TransferSession, summary: &RelaySummary) -> Self {
        Self {
            device: device.to_string(),
            source: session.source.display().to_string(),
            sink: session.sink.to_string(),
            bytes_sent: summary.transmit.bytes_sent,
            chunks: summary.transmit.chunks,
            transit_delay_ms: summary.transmit.estimated_delay.as_millis() as u64,
            records_received: summary.receive.records,
            bytes_received: summary.receive.bytes_written,
        }
    }
}

pub fn render_summary(
    device: &str,
    session: &TransferSession,
    summary: &RelaySummary,
    format: OutputFormat,
) -> String {
    let out = SummaryOutput::new(device, session, summary);
    match format {
        OutputFormat::Json => serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string()),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DEVICE", "SOURCE", "SINK", "SENT", "RECORDS", "DELAY"])
                .add_row(vec![
                    out.device,
                    out.source,
                    out.sink,
                    format!("{} bytes / {} chunks", out.bytes_sent, out.chunks),
                    format!("{} ({} bytes)", out.records_received, out.bytes_received),
                    format!("{} ms", out.transit_delay_ms),
                ]);
            table.to_string()
        }
        OutputFormat::Pretty => format!(
            "device={} source={} sink={} sent={} chunks={} records={} received={} delay_ms={}",
            out.device,
            out.source,
            out.sink,
            out.bytes_sent,
            out.chunks,
            out.records_received,
            out.bytes_received,
            out.transit_delay_ms
        ),
    }
}

pub fn print_summary(
    device: &str,
    session: &TransferSession,
    summary: &RelaySummary,
    format: OutputFormat,
) {
    eprintln!("{}", render_summary(device, session, summary, format));
}
