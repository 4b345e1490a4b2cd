//! # Completion tracker (shutdown coordinator).
//!
//! A counting barrier pre-armed with the number of participants. Each
//! participant holds one [`CompletionGuard`]; dropping it signals completion
//! exactly once, on every exit path including unwinding. Owners block on
//! [`CompletionTracker::wait`] until every guard is gone.
//!
//! ```text
//! armed(3) ──► guard#0 ─drop─┐
//!          ├─► guard#1 ─drop─┼──► remaining 3 → 0 ──► done (broadcast)
//!          └─► guard#2 ─drop─┘
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;

struct Inner {
    remaining: AtomicUsize,
    done: CancellationToken,
}

/// Observer side of the barrier. Cheap to clone.
#[derive(Clone)]
pub struct CompletionTracker {
    inner: Arc<Inner>,
}

/// Participant side of the barrier; signals completion on drop.
#[must_use = "dropping the guard signals completion"]
pub struct CompletionGuard {
    inner: Arc<Inner>,
}

impl CompletionTracker {
    /// Arms a barrier for `participants` and returns one guard per participant.
    ///
    /// With zero participants the tracker is complete immediately.
    pub fn armed(participants: usize) -> (CompletionTracker, Vec<CompletionGuard>) {
        let inner = Arc::new(Inner {
            remaining: AtomicUsize::new(participants),
            done: CancellationToken::new(),
        });
        if participants == 0 {
            inner.done.cancel();
        }
        let guards = (0..participants)
            .map(|_| CompletionGuard {
                inner: Arc::clone(&inner),
            })
            .collect();
        (CompletionTracker { inner }, guards)
    }

    /// Waits until every guard has been dropped. Any number of waiters is released.
    pub async fn wait(&self) {
        self.inner.done.cancelled().await;
    }

    /// Returns `true` once every participant has signalled.
    pub fn is_done(&self) -> bool {
        self.inner.done.is_cancelled()
    }

    /// Participants that have not signalled yet.
    pub fn remaining(&self) -> usize {
        self.inner.remaining.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for CompletionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionTracker")
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if self.inner.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.done.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_done_after_last_guard() {
        let (tracker, mut guards) = CompletionTracker::armed(3);
        assert_eq!(tracker.remaining(), 3);
        guards.pop();
        guards.pop();
        assert!(!tracker.is_done());
        guards.clear();
        tracker.wait().await;
        assert!(tracker.is_done());
        assert_eq!(tracker.remaining(), 0);
    }

    #[tokio::test]
    async fn test_zero_participants_is_done() {
        let (tracker, guards) = CompletionTracker::armed(0);
        assert!(guards.is_empty());
        tracker.wait().await;
    }

    #[tokio::test]
    async fn test_panicking_participant_still_signals() {
        let (tracker, mut guards) = CompletionTracker::armed(1);
        let guard = guards.remove(0);
        let res = tokio::spawn(async move {
            let _guard = guard;
            panic!("crash mid-processing");
        })
        .await;
        assert!(res.is_err());
        tracker.wait().await;
    }
}
