use std::io::{Read, Write};

use serelay_record::{ReaderConfig, RecordError, RecordReader, RecordWriter};
use serelay_transport::{ByteChannel, StopSignal};
use tracing::{debug, info};

use crate::error::{RelayError, Result};
use crate::session::SinkTarget;

/// What the receiver wrote to its sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveReport {
    pub records: u64,
    pub bytes_written: u64,
}

/// Decodes records from a channel and appends them to a sink.
///
/// The loop has no exit of its own besides end-of-stream or an error; it is
/// meant to be stopped from outside through a [`StopSignal`].
#[derive(Debug, Clone, Default)]
pub struct Receiver {
    config: ReaderConfig,
}

impl Receiver {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Open `sink` and relay records from `channel` into it.
    pub fn run<C: ByteChannel>(
        &self,
        channel: C,
        sink: &SinkTarget,
        stop: StopSignal,
    ) -> Result<ReceiveReport> {
        let out = sink.open()?;
        let channel_name = channel.describe();
        self.relay(channel, &channel_name, out, &sink.to_string(), stop)
    }

    /// Relay records from any reader into any writer until end-of-stream.
    pub fn relay<R: Read, W: Write>(
        &self,
        channel: R,
        channel_name: &str,
        sink: W,
        sink_name: &str,
        stop: StopSignal,
    ) -> Result<ReceiveReport> {
        let mut reader =
            RecordReader::with_config(channel, self.config.clone()).with_stop_signal(stop);
        let mut writer = RecordWriter::new(sink);

        loop {
            let record = match reader.decode_next() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(err) => return Err(RelayError::from_record(err, channel_name)),
            };

            writer
                .write_record(&record)
                .map_err(|err| sink_write_error(err, sink_name))?;
            debug!(arity = record.arity(), %record, "record received");
        }

        let report = ReceiveReport {
            records: writer.records_written(),
            bytes_written: writer.bytes_written(),
        };
        info!(records = report.records, sink = sink_name, "receiver finished");
        Ok(report)
    }
}

fn sink_write_error(err: RecordError, sink_name: &str) -> RelayError {
    let source = match err {
        RecordError::Io(source) => source,
        other => std::io::Error::other(other.to_string()),
    };
    RelayError::SinkWrite {
        name: sink_name.to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::os::unix::net::UnixStream;
    use std::time::Duration;

    use super::*;
    use crate::error::codes;

    fn relay_bytes(wire: &[u8]) -> (Result<ReceiveReport>, Vec<u8>) {
        let mut out = Vec::new();
        let result = Receiver::new(ReaderConfig::until_eof()).relay(
            Cursor::new(wire.to_vec()),
            "chan",
            &mut out,
            "sink",
            StopSignal::new(),
        );
        (result, out)
    }

    #[test]
    fn writes_each_record_as_a_line() {
        let (result, out) = relay_bytes(b"1,2,3\n4,5\n");
        let report = result.unwrap();
        assert_eq!(report.records, 2);
        assert_eq!(report.bytes_written, 10);
        assert_eq!(out, b"1,2,3\n4,5\n");
    }

    #[test]
    fn normalises_whitespace_and_crlf() {
        let (result, out) = relay_bytes(b" 1, 2\r\n\n-3\r\n");
        assert_eq!(result.unwrap().records, 2);
        assert_eq!(out, b"1,2\n-3\n");
    }

    #[test]
    fn decode_error_is_not_swallowed() {
        let (result, out) = relay_bytes(b"1,2\n1,2,\n3\n");
        let err = result.unwrap_err();
        assert_eq!(err.code(), codes::DECODE);
        assert_eq!(out, b"1,2\n");
    }

    #[test]
    fn empty_input_succeeds_with_nothing_written() {
        let (result, out) = relay_bytes(b"");
        assert_eq!(result.unwrap(), ReceiveReport::default());
        assert!(out.is_empty());
    }

    #[test]
    fn sink_write_failure_is_reported() {
        struct ClosedSink;
        impl Write for ClosedSink {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let err = Receiver::default()
            .relay(
                Cursor::new(b"1\n".to_vec()),
                "chan",
                ClosedSink,
                "out.csv",
                StopSignal::new(),
            )
            .unwrap_err();
        assert_eq!(err.code(), codes::SINK_WRITE);
        assert!(err.to_string().contains("out.csv"));
    }

    #[test]
    fn run_writes_file_sink_and_stops_on_signal() {
        let dir = std::env::temp_dir().join(format!("serelay-rx-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let out_path = dir.join("out.csv");

        let (mut left, right) = UnixStream::pair().unwrap();
        right
            .set_read_timeout(Some(Duration::from_millis(20)))
            .unwrap();
        let stop = StopSignal::new();
        let sink = SinkTarget::File(out_path.clone());

        let handle = {
            let stop = stop.clone();
            std::thread::spawn(move || {
                Receiver::new(ReaderConfig::until_stopped()).run(right, &sink, stop)
            })
        };

        left.write_all(b"7,8,9\n").unwrap();
        std::thread::sleep(Duration::from_millis(50));
        stop.raise();

        let report = handle.join().unwrap().unwrap();
        assert_eq!(report.records, 1);
        assert_eq!(std::fs::read(&out_path).unwrap(), b"7,8,9\n");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn run_fails_when_sink_cannot_open() {
        let (_left, right) = UnixStream::pair().unwrap();
        let sink = SinkTarget::File("/nonexistent/serelay/out.csv".into());
        let err = Receiver::default()
            .run(right, &sink, StopSignal::new())
            .unwrap_err();
        assert_eq!(err.code(), codes::SINK_OPEN);
    }
}
