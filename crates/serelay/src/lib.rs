//! Serial-link file relay.
//!
//! serelay streams a file to a serial device while concurrently decoding the
//! comma-separated integer records that arrive back on the same device.
//!
//! # Crate Structure
//!
//! - [`transport`]: Raw termios serial port and the byte channel seam
//! - [`record`]: Variable-arity record codec and buffered reader/writer
//! - [`relay`]: Transmitter, receiver, coordinator and byte forwarder

/// Re-export transport types.
pub mod transport {
    pub use serelay_transport::*;
}

/// Re-export record types.
pub mod record {
    pub use serelay_record::*;
}

/// Re-export relay types.
pub mod relay {
    pub use serelay_relay::*;
}
