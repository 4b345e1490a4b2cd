//! # LogWriter: forwards events to `tracing`
//!
//! Install any `tracing` subscriber (for example `tracing_subscriber::fmt`)
//! to see the output.
//!
//! ## Example output
//! ```text
//! INFO  corral: worker started source="pool" worker=3
//! WARN  corral: item dropped source="gate" reason="full" dropped=17
//! WARN  corral: attempt failed source="db-ping" attempt=2 reason="check failed: ping error"
//! INFO  corral: retry scheduled source="db-ping" attempt=2 delay_ms=100
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let source = e.source.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::WorkerStarted => {
                tracing::info!(source, worker = e.worker, "worker started");
            }
            EventKind::WorkerStopped => {
                tracing::info!(source, worker = e.worker, handled = e.count, "worker stopped");
            }
            EventKind::HandlerPanicked => {
                tracing::error!(source, worker = e.worker, reason, "handler panicked");
            }
            EventKind::PoolClosed => {
                tracing::info!(source, "pool closed");
            }
            EventKind::GraceExceeded => {
                tracing::warn!(source, stuck = e.count, "shutdown grace exceeded");
            }
            EventKind::ItemDropped => {
                tracing::warn!(source, reason, dropped = e.count, "item dropped");
            }
            EventKind::AttemptStarting => {
                tracing::debug!(source, attempt = e.attempt, "attempt starting");
            }
            EventKind::AttemptFailed => {
                tracing::warn!(source, attempt = e.attempt, reason, "attempt failed");
            }
            EventKind::RetryScheduled => {
                tracing::info!(source, attempt = e.attempt, delay_ms = e.delay_ms, "retry scheduled");
            }
            EventKind::RetrySucceeded => {
                tracing::info!(source, attempt = e.attempt, "check succeeded");
            }
            EventKind::RetryExhausted => {
                tracing::error!(source, attempts = e.attempt, reason, "retry gave up");
            }
            EventKind::FanOutCompleted => {
                tracing::info!(source, results = e.count, reason, "fan-out completed");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(subscriber = source, reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(subscriber = source, reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
