use std::path::PathBuf;

use serelay_record::RecordError;
use serelay_transport::SerialError;

/// Process exit codes, one per failure category.
pub mod codes {
    pub const SUCCESS: i32 = 0;
    pub const DEVICE_OPEN: i32 = -1;
    pub const DEVICE_CONFIG: i32 = -2;
    pub const SPAWN: i32 = -3;
    pub const SOURCE_OPEN: i32 = -4;
    pub const SOURCE_READ: i32 = -5;
    pub const CHANNEL_WRITE: i32 = -6;
    pub const CHANNEL_CLOSE: i32 = -7;
    pub const CHANNEL_READ: i32 = -8;
    pub const SINK_OPEN: i32 = -9;
    pub const SINK_WRITE: i32 = -10;
    pub const DECODE: i32 = -11;
    pub const SIGNAL: i32 = -12;
    pub const CHILD_WAIT: i32 = -13;
    pub const CHILD_FAILURE: i32 = -14;
}

/// Errors that can occur while relaying.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The serial device could not be opened or configured.
    #[error(transparent)]
    Serial(#[from] SerialError),

    /// The receiving unit could not be started.
    #[error("failed to start receiver: {0}")]
    Spawn(std::io::Error),

    #[error("failed to open input file {path}: {source}")]
    SourceOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {name}: {source}")]
    SourceRead {
        name: String,
        source: std::io::Error,
    },

    #[error("failed to write to {name}: {source}")]
    ChannelWrite {
        name: String,
        source: std::io::Error,
    },

    /// Fewer bytes were accepted than requested.
    #[error("short write to {name}: {written} of {requested} bytes")]
    ShortWrite {
        name: String,
        written: usize,
        requested: usize,
    },

    #[error("failed to close {name}: {source}")]
    ChannelClose {
        name: String,
        source: std::io::Error,
    },

    #[error("failed to read from {name}: {source}")]
    ChannelRead {
        name: String,
        source: std::io::Error,
    },

    #[error("failed to open output {name}: {source}")]
    SinkOpen {
        name: String,
        source: std::io::Error,
    },

    #[error("failed to write output {name}: {source}")]
    SinkWrite {
        name: String,
        source: std::io::Error,
    },

    /// A malformed record arrived on the channel.
    #[error("failed to decode record: {0}")]
    Decode(RecordError),

    /// The receiver could not be asked to stop.
    #[error("failed to signal receiver: {0}")]
    Signal(String),

    /// The receiver's termination could not be collected.
    #[error("failed to wait for receiver: {0}")]
    ChildWait(String),

    /// The receiver terminated with an error of its own.
    #[error("receiver failed: {0}")]
    ChildFailure(Box<RelayError>),
}

impl RelayError {
    /// Exit code for this failure category.
    pub fn code(&self) -> i32 {
        match self {
            RelayError::Serial(err) if err.is_open_failure() => codes::DEVICE_OPEN,
            RelayError::Serial(_) => codes::DEVICE_CONFIG,
            RelayError::Spawn(_) => codes::SPAWN,
            RelayError::SourceOpen { .. } => codes::SOURCE_OPEN,
            RelayError::SourceRead { .. } => codes::SOURCE_READ,
            RelayError::ChannelWrite { .. } | RelayError::ShortWrite { .. } => {
                codes::CHANNEL_WRITE
            }
            RelayError::ChannelClose { .. } => codes::CHANNEL_CLOSE,
            RelayError::ChannelRead { .. } => codes::CHANNEL_READ,
            RelayError::SinkOpen { .. } => codes::SINK_OPEN,
            RelayError::SinkWrite { .. } => codes::SINK_WRITE,
            RelayError::Decode(_) => codes::DECODE,
            RelayError::Signal(_) => codes::SIGNAL,
            RelayError::ChildWait(_) => codes::CHILD_WAIT,
            RelayError::ChildFailure(_) => codes::CHILD_FAILURE,
        }
    }

    /// Map a record-layer error raised while reading from `channel`.
    pub(crate) fn from_record(err: RecordError, channel: &str) -> Self {
        match err {
            RecordError::Io(source) => RelayError::ChannelRead {
                name: channel.to_string(),
                source,
            },
            other => RelayError::Decode(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
