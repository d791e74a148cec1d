//! Progress reporting and cooperative cancellation for long simulation runs.
//!
//! The orchestrator works through trials in chunks. Between chunks it hands
//! the completed percentage to a [`ProgressSink`] and checks a
//! [`CancellationToken`]; neither is touched while a chunk is running.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives the share of trials completed, as a percentage in `(0, 100]`.
///
/// Reports are monotonically increasing and the last report of a run that
/// completes is exactly `100.0`. Any `FnMut(f64)` closure is a sink.
pub trait ProgressSink {
    fn report(&mut self, percent_complete: f64);
}

impl<F: FnMut(f64)> ProgressSink for F {
    fn report(&mut self, percent_complete: f64) {
        self(percent_complete)
    }
}

/// Sink that discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _percent_complete: f64) {}
}

/// Shared flag a caller can set to stop a run between chunks.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from an existing flag (for UI integration)
    pub fn from_atomic(cancelled: Arc<AtomicBool>) -> Self {
        Self { cancelled }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
