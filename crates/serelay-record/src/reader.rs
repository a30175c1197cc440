use std::io::{ErrorKind, Read};
use std::time::{Duration, Instant};

use bytes::BytesMut;
use serelay_transport::StopSignal;
use tracing::trace;

use crate::codec::{decode_record, decode_trailing, Record};
use crate::error::{RecordError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 256;

/// How long a stopped reader keeps reading while data is still arriving.
///
/// Matches the default one-second device read timeout, so a stop takes
/// effect within one read timeout whether the line is idle or busy.
pub const DEFAULT_STOP_DRAIN: Duration = Duration::from_secs(1);

/// How a [`RecordReader`] decides that the stream has ended.
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    /// Consecutive idle reads (zero bytes, `WouldBlock` or `TimedOut`)
    /// tolerated before end-of-stream. `None` waits for a stop request.
    pub idle_limit: Option<u32>,
    /// Once a stop is seen, reads continue only while data keeps arriving
    /// and only for this long. Zero ends right after the buffered bytes.
    pub stop_drain: Duration,
}

impl ReaderConfig {
    /// End on the first idle read. Suits sources where zero bytes means EOF.
    pub fn until_eof() -> Self {
        Self {
            idle_limit: Some(0),
            stop_drain: Duration::ZERO,
        }
    }

    /// Keep reading through idle timeouts until a stop is requested.
    pub fn until_stopped() -> Self {
        Self {
            idle_limit: None,
            stop_drain: DEFAULT_STOP_DRAIN,
        }
    }
}

/// Reads complete records from any `Read` stream.
///
/// Handles partial reads internally: callers always get whole records.
pub struct RecordReader<T> {
    inner: T,
    buf: BytesMut,
    config: ReaderConfig,
    stop: Option<StopSignal>,
    idle_reads: u32,
    stop_seen: Option<Instant>,
    ended: bool,
}

impl<T: Read> RecordReader<T> {
    /// Create a reader that ends at the first zero-byte read.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, ReaderConfig::until_eof())
    }

    /// Create a reader with explicit configuration.
    pub fn with_config(inner: T, config: ReaderConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            stop: None,
            idle_reads: 0,
            stop_seen: None,
            ended: false,
        }
    }

    /// End the stream once `stop` is raised: at the next idle read, or when
    /// the configured drain window runs out if data keeps arriving.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Read the next record (blocking).
    ///
    /// Returns `Ok(None)` at end-of-stream. Bytes already buffered are always
    /// decoded before end-of-stream is reported.
    pub fn decode_next(&mut self) -> Result<Option<Record>> {
        loop {
            if let Some(record) = decode_record(&mut self.buf)? {
                return Ok(Some(record));
            }

            if self.ended {
                return decode_trailing(&mut self.buf);
            }

            if self.drain_expired() {
                trace!("stop requested and drain window over, ending record stream");
                self.ended = true;
                continue;
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            match self.inner.read(&mut chunk) {
                Ok(0) => self.on_idle(),
                Ok(n) => {
                    self.idle_reads = 0;
                    self.buf.extend_from_slice(&chunk[..n]);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    self.on_idle()
                }
                Err(err) => return Err(RecordError::Io(err)),
            }
        }
    }

    fn drain_expired(&mut self) -> bool {
        if !self.stop.as_ref().is_some_and(StopSignal::is_raised) {
            return false;
        }
        let seen = *self.stop_seen.get_or_insert_with(Instant::now);
        seen.elapsed() >= self.config.stop_drain
    }

    fn on_idle(&mut self) {
        if self.stop.as_ref().is_some_and(StopSignal::is_raised) {
            trace!("stop requested, ending record stream");
            self.ended = true;
            return;
        }

        self.idle_reads = self.idle_reads.saturating_add(1);
        if let Some(limit) = self.config.idle_limit {
            if self.idle_reads > limit {
                trace!(idle_reads = self.idle_reads, "idle limit reached");
                self.ended = true;
            }
        }
    }
}

impl<T: Read> Iterator for RecordReader<T> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode_next().transpose()
    }
}
