use std::path::PathBuf;

/// Errors that can occur while opening or configuring a serial device.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    /// The device node could not be opened.
    #[error("failed to open serial device {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The current line discipline attributes could not be queried.
    #[error("failed to read attributes of {path}: {source}")]
    GetAttributes {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The new line discipline could not be committed.
    #[error("failed to apply attributes to {path}: {source}")]
    SetAttributes {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Pending input/output could not be discarded after configuration.
    #[error("failed to flush {path}: {source}")]
    Flush {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested baud rate has no termios speed constant.
    #[error("unsupported baud rate {0}")]
    UnsupportedBaudRate(u32),

    /// An I/O error occurred on the open device.
    #[error("serial I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SerialError {
    /// True when the failure happened before the device was opened.
    pub fn is_open_failure(&self) -> bool {
        matches!(self, SerialError::Open { .. })
    }
}

pub type Result<T> = std::result::Result<T, SerialError>;
