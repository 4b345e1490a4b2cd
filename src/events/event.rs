//! # Runtime events emitted by the coordination primitives.
//!
//! The [`EventKind`] enum classifies events across four areas:
//! - **Pool events**: worker lifecycle and shutdown
//! - **Gate events**: overload shedding
//! - **Retry events**: attempts, scheduling and terminal outcomes
//! - **Subscriber events**: overflow and panics inside subscribers
//!
//! The [`Event`] struct carries optional metadata (source name, worker id,
//! attempt number, delay, reason).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore order when events arrive out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use corral::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::RetryScheduled)
//!     .with_source("db-ping")
//!     .with_attempt(2)
//!     .with_delay(Duration::from_millis(250))
//!     .with_reason("ping error");
//!
//! assert_eq!(ev.kind, EventKind::RetryScheduled);
//! assert_eq!(ev.source.as_deref(), Some("db-ping"));
//! assert_eq!(ev.delay_ms, Some(250));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Pool events ===
    /// A pool worker entered its receive loop.
    ///
    /// Sets:
    /// - `source`: pool name
    /// - `worker`: worker id
    WorkerStarted,

    /// A pool worker observed closure, drained, and exited.
    ///
    /// Sets:
    /// - `source`: pool name
    /// - `worker`: worker id
    /// - `count`: items handled by this worker
    WorkerStopped,

    /// A handler panicked while processing an item; the worker keeps going.
    ///
    /// Sets:
    /// - `source`: pool name
    /// - `worker`: worker id
    /// - `reason`: panic message
    HandlerPanicked,

    /// The pool's channel was closed; no further submissions are accepted.
    ///
    /// Sets:
    /// - `source`: pool name
    PoolClosed,

    /// Shutdown grace elapsed with workers still running.
    ///
    /// Sets:
    /// - `source`: pool name
    /// - `count`: number of stuck workers
    GraceExceeded,

    // === Gate events ===
    /// A submission was shed by a backpressure gate.
    ///
    /// Sets:
    /// - `source`: gate name
    /// - `reason`: "full" or "closed"
    /// - `count`: total drops so far on this gate
    ItemDropped,

    // === Retry events ===
    /// A retry loop is invoking its check.
    ///
    /// Sets:
    /// - `source`: retry name
    /// - `attempt`: attempt number (1-based)
    AttemptStarting,

    /// A check attempt failed.
    ///
    /// Sets:
    /// - `source`: retry name
    /// - `attempt`: attempt number
    /// - `reason`: failure message
    AttemptFailed,

    /// Next attempt scheduled after a failure.
    ///
    /// Sets:
    /// - `source`: retry name
    /// - `attempt`: failed attempt number
    /// - `delay_ms`: wait before the next attempt
    /// - `reason`: last failure message
    RetryScheduled,

    /// The check succeeded.
    ///
    /// Sets:
    /// - `source`: retry name
    /// - `attempt`: successful attempt number
    RetrySucceeded,

    /// The loop gave up (deadline fired or a fatal error).
    ///
    /// Sets:
    /// - `source`: retry name
    /// - `attempt`: attempts made
    /// - `reason`: terminal error
    RetryExhausted,

    // === Fan-out events ===
    /// A fan-out collector finished.
    ///
    /// Sets:
    /// - `source`: fan-out name
    /// - `count`: results received
    /// - `reason`: set only when results were lost
    FanOutCompleted,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the emitting primitive (pool, gate, retry loop, subscriber).
    pub source: Option<Arc<str>>,
    /// Worker id inside a pool.
    pub worker: Option<usize>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Delay before the next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Counter attached to the event (items handled, drops, results).
    pub count: Option<u64>,
    /// Human-readable reason (errors, panic messages, drop reasons).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            source: None,
            worker: None,
            attempt: None,
            delay_ms: None,
            count: None,
            reason: None,
        }
    }

    /// Attaches the emitting primitive's name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches a worker id.
    #[inline]
    pub fn with_worker(mut self, id: usize) -> Self {
        self.worker = Some(id);
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a counter value.
    #[inline]
    pub fn with_count(mut self, n: u64) -> Self {
        self.count = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }

    /// Returns `true` for overflow notices, which are never re-reported.
    #[inline]
    pub(crate) fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let a = Event::new(EventKind::WorkerStarted);
        let b = Event::new(EventKind::WorkerStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_only_overflow_notices_are_flagged() {
        assert!(Event::new(EventKind::SubscriberOverflow).is_subscriber_overflow());
        assert!(!Event::new(EventKind::RetryScheduled).is_subscriber_overflow());
    }

    #[test]
    fn test_delay_saturates() {
        let ev = Event::new(EventKind::RetryScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }
}
