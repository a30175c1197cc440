/// Errors that can occur while decoding or writing records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// A line could not be parsed as 1 to 5 comma-separated integers.
    #[error("malformed record {line:?}: {reason}")]
    Malformed { line: String, reason: &'static str },

    /// A line carried more fields than a record can hold.
    #[error("record has {count} fields (max {max})")]
    TooManyFields { count: usize, max: usize },

    /// A record was built from an out-of-range number of fields.
    #[error("record arity {0} outside 1..=5")]
    InvalidArity(usize),

    /// No delimiter was found within the maximum line length.
    #[error("line exceeds {max} bytes without a delimiter")]
    LineTooLong { max: usize },

    /// An I/O error occurred while reading or writing records.
    #[error("record I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RecordError>;
