//! Two-sided serial relay.
//!
//! A [`Transmitter`] streams a source file onto the serial channel while a
//! [`Receiver`] running on its own thread decodes records arriving on the
//! same channel and appends them to a sink. The [`Coordinator`] stops the
//! receiver only after the transmitter is done and the estimated transit
//! delay has elapsed, so bytes still on the wire are not lost.
//!
//! [`Forwarder`] is the simpler variant: a byte-level pump between the
//! device and stdin/stdout with no framing.

pub mod coordinator;
pub mod error;
pub mod forward;
pub mod receiver;
pub mod session;
pub mod transmitter;

pub use coordinator::{
    Coordinator, Phase, ReceiverSpawner, ReceiverThread, ReceiverUnit, RelaySummary,
    ThreadSpawner,
};
#[cfg(unix)]
pub use coordinator::relay;
pub use error::{codes, RelayError, Result};
pub use forward::{Forwarder, Role, FORWARD_CHUNK_SIZE};
pub use receiver::{ReceiveReport, Receiver};
pub use session::{RelayConfig, SinkTarget, TransferSession, CHUNK_SIZE, TRANSIT_DELAY_PER_BYTE};
pub use transmitter::{TransmitOutcome, TransmitReport, Transmitter};
