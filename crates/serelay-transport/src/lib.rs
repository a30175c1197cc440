//! Serial transport for serelay.
//!
//! Opens a character device and commits a raw line discipline (8 data bits,
//! 2 stop bits, no parity, no flow control, decisecond read timeout) before
//! handing out a byte channel. This is the lowest layer; the record codec and
//! the relay build on the [`ByteChannel`] seam defined here.

pub mod config;
pub mod error;
pub mod signal;
pub mod traits;

#[cfg(unix)]
pub mod port;

pub use config::{DataBits, Parity, SerialConfig, StopBits, DEFAULT_BAUD_RATE, DEFAULT_DEVICE};
pub use error::{Result, SerialError};
pub use signal::StopSignal;
pub use traits::ByteChannel;

#[cfg(unix)]
pub use port::{apply_line_discipline, SerialPort};
