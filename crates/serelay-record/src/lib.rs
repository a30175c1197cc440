//! Variable-arity integer records over a continuous byte stream.
//!
//! A record is one line of 1 to 5 comma-separated signed integers:
//!
//! ```text
//! 1,2,3\n
//! -4,5\n
//! ```
//!
//! [`RecordReader`] pulls records out of any `Read` source and handles
//! partial reads, idle timeouts and stop requests internally.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_record, decode_trailing, encode_record, Record, DELIMITER, MAX_FIELDS, MAX_LINE_LEN,
    SEPARATOR,
};
pub use error::{RecordError, Result};
pub use reader::{ReaderConfig, RecordReader, DEFAULT_STOP_DRAIN};
pub use writer::RecordWriter;
