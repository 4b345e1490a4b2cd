use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::drop_policy::{DropDecision, DropPolicy, DropReason};
use crate::channel::{self, Receiver, Sender, TrySendError};
use crate::events::{Bus, Emitter, EventKind};

/// Counters kept by a gate since it was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Submissions that reached the buffer.
    pub delivered: u64,
    /// Submissions that were shed.
    pub dropped: u64,
}

#[derive(Default)]
struct Counters {
    delivered: AtomicU64,
    dropped: AtomicU64,
}

/// Bounded, never-blocking entry point for a stream of work.
///
/// Cloning shares the buffer, the policy and the counters.
pub struct BackpressureGate<T> {
    tx: Sender<T>,
    policy: DropPolicy<T>,
    counters: Arc<Counters>,
    emitter: Emitter,
}

impl<T> BackpressureGate<T> {
    /// Creates a gate with room for `capacity` items (at least 1) and its receiving end.
    pub fn new(capacity: usize) -> (BackpressureGate<T>, Receiver<T>) {
        let (tx, rx) = channel::channel(capacity.max(1));
        let gate = BackpressureGate {
            tx,
            policy: DropPolicy::Discard,
            counters: Arc::new(Counters::default()),
            emitter: Emitter::new("gate"),
        };
        (gate, rx)
    }

    /// Replaces the drop policy.
    pub fn with_policy(mut self, policy: DropPolicy<T>) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the name used as the event source.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.emitter.set_source(name);
        self
    }

    /// Publishes an `ItemDropped` event for every shed item.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.emitter.set_bus(bus);
        self
    }

    /// Offers `item` to the buffer without waiting.
    pub fn try_send(&self, item: T) -> DropDecision {
        let (item, reason) = match self.tx.try_send(item) {
            Ok(()) => {
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                return DropDecision::Delivered;
            }
            Err(TrySendError::Full(item)) => (item, DropReason::Full),
            Err(TrySendError::Closed(item)) => (item, DropReason::Closed),
        };
        let dropped = self.counters.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        self.emitter.emit(EventKind::ItemDropped, |ev| {
            ev.with_reason(reason.as_label()).with_count(dropped)
        });
        tracing::trace!(gate = self.emitter.source(), reason = reason.as_label(), dropped, "item dropped");
        self.policy.shed(item, reason);
        DropDecision::Dropped
    }

    /// Closes the gate; later submissions are dropped with [`DropReason::Closed`].
    ///
    /// Items already buffered still drain to the receiver.
    pub fn close(&self) {
        self.tx.close();
    }

    /// Returns `true` once the gate is closed or its receivers are gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Buffer capacity.
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    /// Snapshot of the delivered/dropped counters.
    pub fn stats(&self) -> GateStats {
        GateStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }
}

impl<T> Clone for BackpressureGate<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            policy: self.policy.clone(),
            counters: Arc::clone(&self.counters),
            emitter: self.emitter.clone(),
        }
    }
}

impl<T> std::fmt::Debug for BackpressureGate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackpressureGate")
            .field("name", &self.emitter.source())
            .field("capacity", &self.capacity())
            .field("policy", &self.policy)
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_burst_delivered_plus_dropped_equals_total() {
        let (gate, rx) = BackpressureGate::new(4);
        let decisions: Vec<_> = (0..100).map(|i| gate.try_send(i)).collect();

        let stats = gate.stats();
        assert_eq!(stats.delivered + stats.dropped, 100);
        assert_eq!(stats.delivered, 4);
        assert!(decisions[..4].iter().all(|d| d.is_delivered()));

        gate.close();
        let mut drained = Vec::new();
        while let Some(i) = rx.recv().await {
            drained.push(i);
        }
        assert_eq!(drained, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_drop_handler_receives_item_and_reason() {
        let shed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&shed);
        let (gate, _rx) = BackpressureGate::<&'static str>::new(1);
        let gate = gate.with_policy(DropPolicy::handler(move |item, reason| {
            sink.lock().unwrap().push((item, reason));
        }));

        assert_eq!(gate.try_send("kept"), DropDecision::Delivered);
        assert_eq!(gate.try_send("overflow"), DropDecision::Dropped);
        gate.close();
        assert_eq!(gate.try_send("late"), DropDecision::Dropped);

        assert_eq!(
            *shed.lock().unwrap(),
            vec![("overflow", DropReason::Full), ("late", DropReason::Closed)]
        );
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let (gate, rx) = BackpressureGate::new(0);
        assert_eq!(gate.capacity(), 1);
        assert_eq!(gate.try_send(7u8), DropDecision::Delivered);
        assert_eq!(rx.recv().await, Some(7));
    }

    #[tokio::test]
    async fn test_drops_are_published() {
        let bus = Bus::new(16);
        let mut events = bus.subscribe();
        let (gate, _rx) = BackpressureGate::new(1);
        let gate = gate.with_name("ingest").with_bus(bus);
        gate.try_send(1);
        gate.try_send(2);

        let ev = events.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::ItemDropped);
        assert_eq!(ev.source.as_deref(), Some("ingest"));
        assert_eq!(ev.reason.as_deref(), Some("full"));
        assert_eq!(ev.count, Some(1));
    }
}
