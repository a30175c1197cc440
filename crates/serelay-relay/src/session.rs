use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use serelay_record::ReaderConfig;

use crate::error::{RelayError, Result};

/// Bytes read from the source per write to the channel.
pub const CHUNK_SIZE: usize = 100;

/// Estimated time one byte spends on the wire before it can be read back.
///
/// A proportional stand-in for acknowledgement-based flow control: the
/// receiver is stopped only after `bytes_sent * TRANSIT_DELAY_PER_BYTE`.
pub const TRANSIT_DELAY_PER_BYTE: Duration = Duration::from_millis(1);

/// Where decoded records go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SinkTarget {
    #[default]
    Stdout,
    File(PathBuf),
}

impl SinkTarget {
    /// Open the sink for writing. Files are created or truncated.
    pub fn open(&self) -> Result<Box<dyn Write + Send>> {
        match self {
            SinkTarget::Stdout => Ok(Box::new(std::io::stdout())),
            SinkTarget::File(path) => {
                let file = File::create(path).map_err(|source| RelayError::SinkOpen {
                    name: self.to_string(),
                    source,
                })?;
                Ok(Box::new(file))
            }
        }
    }
}

impl From<Option<PathBuf>> for SinkTarget {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(SinkTarget::Stdout, SinkTarget::File)
    }
}

impl fmt::Display for SinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkTarget::Stdout => f.write_str("<stdout>"),
            SinkTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// One transfer: what to send and where received records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSession {
    pub source: PathBuf,
    pub sink: SinkTarget,
}

impl TransferSession {
    pub fn new(source: impl Into<PathBuf>, sink: SinkTarget) -> Self {
        Self {
            source: source.into(),
            sink,
        }
    }
}

/// Tuning for a relay run.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Source bytes per channel write.
    pub chunk_size: usize,
    /// Transit delay heuristic, see [`TRANSIT_DELAY_PER_BYTE`].
    pub delay_per_byte: Duration,
    /// When the receiver treats its input as ended.
    pub receiver: ReaderConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_SIZE,
            delay_per_byte: TRANSIT_DELAY_PER_BYTE,
            receiver: ReaderConfig::until_stopped(),
        }
    }
}
