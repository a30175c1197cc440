use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop request shared between a supervisor and a worker.
///
/// Workers poll it at points where they would otherwise block again, so a
/// stop takes effect at most one read timeout after it is raised.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this signal to stop.
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}
