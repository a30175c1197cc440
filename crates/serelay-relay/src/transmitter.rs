use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::time::Duration;

use serelay_transport::ByteChannel;
use tracing::{debug, info};

use crate::error::{RelayError, Result};
use crate::session::RelayConfig;

/// What the transmitter pushed onto the channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransmitReport {
    pub bytes_sent: u64,
    pub chunks: u64,
    /// Accumulated transit delay heuristic for the bytes sent.
    pub estimated_delay: Duration,
}

/// Report plus the first failure encountered, if any.
///
/// The report is meaningful even on failure: the coordinator still waits
/// out the delay for whatever was sent before the fault.
#[derive(Debug)]
pub struct TransmitOutcome {
    pub report: TransmitReport,
    pub result: Result<()>,
}

/// Streams a source file onto a byte channel in fixed-size chunks.
#[derive(Debug, Clone)]
pub struct Transmitter {
    chunk_size: usize,
    delay_per_byte: Duration,
}

impl Transmitter {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            delay_per_byte: config.delay_per_byte,
        }
    }

    /// Send `source` over `channel`, then close the channel's write side.
    ///
    /// The close happens whether or not sending succeeded.
    pub fn run<C: ByteChannel>(&self, source: &Path, mut channel: C) -> TransmitOutcome {
        let channel_name = channel.describe();
        let mut report = TransmitReport::default();

        let sent = File::open(source)
            .map_err(|err| RelayError::SourceOpen {
                path: source.to_path_buf(),
                source: err,
            })
            .and_then(|file| {
                self.stream(
                    file,
                    &source.display().to_string(),
                    &mut channel,
                    &channel_name,
                    &mut report,
                )
            });

        let closed = channel
            .close_write()
            .map_err(|source| RelayError::ChannelClose {
                name: channel_name,
                source,
            });

        info!(
            bytes = report.bytes_sent,
            chunks = report.chunks,
            delay_ms = report.estimated_delay.as_millis() as u64,
            ok = sent.is_ok() && closed.is_ok(),
            "transmission finished"
        );

        TransmitOutcome {
            report,
            result: sent.and(closed),
        }
    }

    /// Copy `source` to `channel` chunk by chunk until a zero-byte read.
    ///
    /// Only the bytes actually read are written. A write that accepts fewer
    /// bytes than offered fails the transfer.
    pub fn stream<R: Read, W: Write>(
        &self,
        mut source: R,
        source_name: &str,
        channel: &mut W,
        channel_name: &str,
        report: &mut TransmitReport,
    ) -> Result<()> {
        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            let read = match source.read(&mut chunk) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    return Err(RelayError::SourceRead {
                        name: source_name.to_string(),
                        source: err,
                    })
                }
            };

            let payload = &chunk[..read];
            let written = loop {
                match channel.write(payload) {
                    Ok(n) => break n,
                    Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                    Err(err) => {
                        return Err(RelayError::ChannelWrite {
                            name: channel_name.to_string(),
                            source: err,
                        })
                    }
                }
            };
            if written < read {
                return Err(RelayError::ShortWrite {
                    name: channel_name.to_string(),
                    written,
                    requested: read,
                });
            }

            report.bytes_sent += read as u64;
            report.chunks += 1;
            report.estimated_delay += self.delay_per_byte * read as u32;
            debug!(chunk = report.chunks, bytes = read, "chunk written");
        }
    }
}
