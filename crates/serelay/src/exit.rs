use std::fmt;

use serelay_relay::RelayError;

pub use serelay_relay::codes::SUCCESS;

/// Failures of the CLI itself rather than of the relay.
pub const INTERNAL: i32 = -15;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn relay_error(context: &str, err: RelayError) -> CliError {
    CliError::new(err.code(), format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serelay_relay::codes;

    #[test]
    fn relay_error_keeps_category_code_and_context() {
        let err = relay_error(
            "relay failed",
            RelayError::Signal("receiver already gone".to_string()),
        );
        assert_eq!(err.code, codes::SIGNAL);
        assert_eq!(
            err.to_string(),
            "relay failed: failed to signal receiver: receiver already gone"
        );
    }
}
