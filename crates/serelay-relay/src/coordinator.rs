use std::fmt;
use std::thread::JoinHandle;

use serelay_record::ReaderConfig;
use serelay_transport::{ByteChannel, StopSignal};
use tracing::{debug, info, warn};

use crate::error::{RelayError, Result};
use crate::receiver::{ReceiveReport, Receiver};
use crate::session::{RelayConfig, SinkTarget, TransferSession};
use crate::transmitter::{TransmitReport, Transmitter};

/// Lifecycle of one relay run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Opening and configuring the channel.
    Starting,
    /// Receiver spawned, transmitter sending.
    Running,
    /// Transmitter done, waiting out the transit delay.
    Draining,
    /// Asking the receiver to stop.
    Stopping,
    /// Finished, successfully or not.
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Starting => "starting",
            Phase::Running => "running",
            Phase::Draining => "draining",
            Phase::Stopping => "stopping",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// A running receiver that the coordinator can stop and wait for.
pub trait ReceiverUnit {
    /// Ask the receiver to stop. Fails with [`RelayError::Signal`].
    fn request_stop(&self) -> Result<()>;

    /// Wait for the receiver to terminate and collect its result.
    ///
    /// A receiver that could not be waited for yields
    /// [`RelayError::ChildWait`]; any other error is the receiver's own.
    fn join(self) -> Result<ReceiveReport>;
}

/// Starts receivers on their own unit of execution.
pub trait ReceiverSpawner {
    type Unit: ReceiverUnit;

    fn spawn<C: ByteChannel>(&mut self, channel: C, sink: SinkTarget) -> Result<Self::Unit>;
}

/// Runs each [`Receiver`] on a dedicated OS thread.
#[derive(Debug, Clone, Default)]
pub struct ThreadSpawner {
    receiver: Receiver,
}

impl ThreadSpawner {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            receiver: Receiver::new(config),
        }
    }
}

impl ReceiverSpawner for ThreadSpawner {
    type Unit = ReceiverThread;

    fn spawn<C: ByteChannel>(&mut self, channel: C, sink: SinkTarget) -> Result<ReceiverThread> {
        let stop = StopSignal::new();
        let receiver = self.receiver.clone();
        let thread_stop = stop.clone();

        let handle = std::thread::Builder::new()
            .name("serelay-receiver".to_string())
            .spawn(move || receiver.run(channel, &sink, thread_stop))
            .map_err(RelayError::Spawn)?;

        debug!("receiver thread started");
        Ok(ReceiverThread { stop, handle })
    }
}

/// Handle to a receiver running on a thread.
#[derive(Debug)]
pub struct ReceiverThread {
    stop: StopSignal,
    handle: JoinHandle<Result<ReceiveReport>>,
}

impl ReceiverUnit for ReceiverThread {
    fn request_stop(&self) -> Result<()> {
        self.stop.raise();
        Ok(())
    }

    fn join(self) -> Result<ReceiveReport> {
        self.handle
            .join()
            .map_err(|_| RelayError::ChildWait("receiver thread panicked".to_string()))?
    }
}

/// Totals of a successful relay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    pub transmit: TransmitReport,
    pub receive: ReceiveReport,
}

/// Supervises one transmitter and one receiver sharing a channel.
///
/// The transmitter runs on the caller's thread; the receiver is started
/// through the spawner. The receiver is only stopped once transmission has
/// finished and the transit delay for every byte sent has elapsed.
pub struct Coordinator<S = ThreadSpawner> {
    spawner: S,
    config: RelayConfig,
    phase: Phase,
}

impl Coordinator<ThreadSpawner> {
    pub fn new(config: RelayConfig) -> Self {
        let spawner = ThreadSpawner::new(config.receiver.clone());
        Self::with_spawner(spawner, config)
    }
}

impl<S: ReceiverSpawner> Coordinator<S> {
    pub fn with_spawner(spawner: S, config: RelayConfig) -> Self {
        Self {
            spawner,
            config,
            phase: Phase::Starting,
        }
    }

    /// Phase reached by the most recent run.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "relay phase");
        self.phase = phase;
    }

    /// Open the channel with `open` and relay `session` over it.
    ///
    /// If the receiver fails the result is [`RelayError::ChildFailure`] even
    /// when transmission succeeded; otherwise it is the transmitter's own.
    pub fn run<C, F>(&mut self, open: F, session: &TransferSession) -> Result<RelaySummary>
    where
        C: ByteChannel,
        F: FnOnce() -> serelay_transport::Result<C>,
    {
        self.enter(Phase::Starting);
        let channel = match open() {
            Ok(channel) => channel,
            Err(err) => {
                self.enter(Phase::Done);
                return Err(err.into());
            }
        };

        let reader = match channel.try_clone_channel() {
            Ok(reader) => reader,
            Err(err) => {
                self.enter(Phase::Done);
                return Err(RelayError::Spawn(err));
            }
        };
        let unit = match self.spawner.spawn(reader, session.sink.clone()) {
            Ok(unit) => unit,
            Err(err) => {
                self.enter(Phase::Done);
                return Err(err);
            }
        };

        self.enter(Phase::Running);
        let outcome = Transmitter::new(&self.config).run(&session.source, channel);
        if let Err(err) = &outcome.result {
            warn!(error = %err, "transmitter failed");
        }

        self.enter(Phase::Draining);
        let delay = outcome.report.estimated_delay;
        if !delay.is_zero() {
            debug!(delay_ms = delay.as_millis() as u64, "waiting out transit delay");
            std::thread::sleep(delay);
        }

        self.enter(Phase::Stopping);
        if let Err(err) = unit.request_stop() {
            self.enter(Phase::Done);
            return Err(err);
        }

        self.enter(Phase::Done);
        let received = match unit.join() {
            Ok(report) => report,
            Err(err @ RelayError::ChildWait(_)) => return Err(err),
            Err(err) => return Err(RelayError::ChildFailure(Box::new(err))),
        };
        outcome.result?;

        info!(
            bytes_sent = outcome.report.bytes_sent,
            records = received.records,
            "relay complete"
        );
        Ok(RelaySummary {
            transmit: outcome.report,
            receive: received,
        })
    }
}

/// Relay `session` over the serial device described by `serial`.
#[cfg(unix)]
pub fn relay(
    serial: &serelay_transport::SerialConfig,
    session: &TransferSession,
    config: RelayConfig,
) -> Result<RelaySummary> {
    Coordinator::new(config).run(|| serelay_transport::SerialPort::open(serial), session)
}
