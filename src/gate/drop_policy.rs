use std::sync::Arc;

/// Per-submission outcome of [`BackpressureGate::try_send`](crate::BackpressureGate::try_send).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropDecision {
    /// The item is in the gate's buffer and will reach a receiver.
    Delivered,
    /// The item was shed and handed to the drop policy.
    Dropped,
}

impl DropDecision {
    /// Returns `true` for [`DropDecision::Delivered`].
    pub fn is_delivered(self) -> bool {
        matches!(self, DropDecision::Delivered)
    }
}

/// Why an item was shed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    /// The buffer was at capacity.
    Full,
    /// The gate was closed.
    Closed,
}

impl DropReason {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            DropReason::Full => "full",
            DropReason::Closed => "closed",
        }
    }
}

/// What the gate does with a shed item.
///
/// ## Variants
/// - `Discard`: drop the item silently (counted and published, nothing else)
/// - `Handler`: hand the item to a callback to reroute it, log it, or signal the caller
///
/// The callback runs inline on the submitting task and must not block.
pub enum DropPolicy<T> {
    /// Drop the item.
    Discard,
    /// Pass the item and the reason to a callback.
    Handler(Arc<dyn Fn(T, DropReason) + Send + Sync>),
}

impl<T> DropPolicy<T> {
    /// Wraps a callback as a [`DropPolicy::Handler`].
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(T, DropReason) + Send + Sync + 'static,
    {
        DropPolicy::Handler(Arc::new(f))
    }

    pub(crate) fn shed(&self, item: T, reason: DropReason) {
        match self {
            DropPolicy::Discard => drop(item),
            DropPolicy::Handler(f) => f(item, reason),
        }
    }
}

impl<T> Default for DropPolicy<T> {
    fn default() -> Self {
        DropPolicy::Discard
    }
}

impl<T> Clone for DropPolicy<T> {
    fn clone(&self) -> Self {
        match self {
            DropPolicy::Discard => DropPolicy::Discard,
            DropPolicy::Handler(f) => DropPolicy::Handler(Arc::clone(f)),
        }
    }
}

impl<T> std::fmt::Debug for DropPolicy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropPolicy::Discard => f.write_str("Discard"),
            DropPolicy::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}
