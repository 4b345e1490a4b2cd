//! Channel errors. Every send-side error hands the undelivered item back.

use std::fmt;

use crate::error::DeadlineError;

/// The channel was closed; the item is returned.
pub struct SendError<T>(pub T);

/// Non-blocking send failed; the item is returned.
pub enum TrySendError<T> {
    /// No free slot (or, on a rendezvous channel, no receiver waiting in `recv`).
    Full(T),
    /// The channel was closed.
    Closed(T),
}

/// Deadline-bounded send failed; the item is returned.
pub enum SendTimeoutError<T> {
    /// The channel was closed.
    Closed(T),
    /// The deadline fired before a slot or a receiver became available.
    Abandoned {
        /// The undelivered item.
        item: T,
        /// Why the deadline fired.
        cause: DeadlineError,
    },
}

/// Non-blocking receive failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryRecvError {
    /// Nothing could be taken right now: no item is buffered, or another
    /// receiver is waiting in `recv` and holds the queue.
    Empty,
    /// Closed and fully drained.
    Closed,
}

impl<T> SendError<T> {
    /// Returns the undelivered item.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> TrySendError<T> {
    /// Returns the undelivered item.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(item) | TrySendError::Closed(item) => item,
        }
    }

    /// Returns `true` if the send failed only for lack of space.
    pub fn is_full(&self) -> bool {
        matches!(self, TrySendError::Full(_))
    }
}

impl<T> SendTimeoutError<T> {
    /// Returns the undelivered item.
    pub fn into_inner(self) -> T {
        match self {
            SendTimeoutError::Closed(item) | SendTimeoutError::Abandoned { item, .. } => item,
        }
    }
}

impl<T> fmt::Debug for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendError").finish_non_exhaustive()
    }
}

impl<T> fmt::Display for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("channel closed")
    }
}

impl<T> std::error::Error for SendError<T> {}

impl<T> fmt::Debug for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.write_str("Full(..)"),
            TrySendError::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<T> fmt::Display for TrySendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrySendError::Full(_) => f.write_str("no available capacity"),
            TrySendError::Closed(_) => f.write_str("channel closed"),
        }
    }
}

impl<T> std::error::Error for TrySendError<T> {}

impl<T> fmt::Debug for SendTimeoutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendTimeoutError::Closed(_) => f.write_str("Closed(..)"),
            SendTimeoutError::Abandoned { cause, .. } => f
                .debug_struct("Abandoned")
                .field("cause", cause)
                .finish_non_exhaustive(),
        }
    }
}

impl<T> fmt::Display for SendTimeoutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendTimeoutError::Closed(_) => f.write_str("channel closed"),
            SendTimeoutError::Abandoned { cause, .. } => write!(f, "send abandoned: {cause}"),
        }
    }
}

impl<T> std::error::Error for SendTimeoutError<T> {}

impl fmt::Display for TryRecvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryRecvError::Empty => f.write_str("channel empty"),
            TryRecvError::Closed => f.write_str("channel closed"),
        }
    }
}

impl std::error::Error for TryRecvError {}
