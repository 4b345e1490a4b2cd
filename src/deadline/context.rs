//! # Deadline / cancellation context.
//!
//! [`Deadline`] is a one-shot, monotonic, broadcastable signal. It fires once,
//! either when its timer elapses or when its [`CancelHandle`] is used, and
//! stays fired forever after.
//!
//! ## State machine
//! ```text
//! Active ──(timer elapsed)──► Fired{ Exceeded }
//!    │
//!    └────(cancel / drop)───► Fired{ Cancelled }
//!
//! child: Active ──(parent fired)──► Fired{ parent's cause }
//! ```
//!
//! ## Rules
//! - The first cause wins; an observed cause never changes.
//! - Any number of waiters blocked in [`Deadline::done`] are all released.
//! - A timed deadline owns a background timer task. The timer stops when the
//!   deadline fires, so the owner **must** release it: call
//!   [`CancelHandle::cancel`] or drop every clone of the handle.
//! - Expiry is also checked lazily on every query, so a deadline whose instant
//!   has passed reports `Exceeded` even before the timer task gets scheduled.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use corral::{Deadline, DeadlineError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let (ctx, cancel) = Deadline::with_timeout(Duration::from_secs(30));
//!     assert!(!ctx.is_fired());
//!
//!     cancel.cancel();
//!     assert_eq!(ctx.done().await, DeadlineError::Cancelled);
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::DeadlineError;

/// Own timer of one deadline level.
#[derive(Clone, Copy, Debug)]
struct Expiry {
    at: Instant,
    timeout: Duration,
}

struct Inner {
    token: CancellationToken,
    cause: OnceLock<DeadlineError>,
    expiry: Option<Expiry>,
    parent: Option<Arc<Inner>>,
}

impl Inner {
    fn new(expiry: Option<Expiry>, parent: Option<Arc<Inner>>) -> Arc<Self> {
        let token = match &parent {
            Some(p) => p.token.child_token(),
            None => CancellationToken::new(),
        };
        Arc::new(Self {
            token,
            cause: OnceLock::new(),
            expiry,
            parent,
        })
    }

    /// Records `cause` (first writer wins) and releases every waiter.
    fn fire(&self, cause: DeadlineError) {
        if self.cause.set(cause).is_ok() {
            tracing::trace!(cause = cause.as_label(), "deadline fired");
        }
        self.token.cancel();
    }

    /// Fires this level (or an ancestor) if its instant has already passed.
    fn expire_if_due(&self, now: Instant) {
        if self.token.is_cancelled() {
            return;
        }
        if let Some(parent) = &self.parent {
            parent.expire_if_due(now);
            if self.token.is_cancelled() {
                return;
            }
        }
        if let Some(exp) = self.expiry {
            if exp.at <= now {
                self.fire(DeadlineError::Exceeded {
                    timeout: exp.timeout,
                });
            }
        }
    }

    fn cause(&self) -> Option<DeadlineError> {
        if !self.token.is_cancelled() {
            return None;
        }
        let inherited = || {
            self.parent
                .as_ref()
                .and_then(|p| p.cause())
                .unwrap_or(DeadlineError::Cancelled)
        };
        Some(*self.cause.get_or_init(inherited))
    }

    /// Earliest instant at which this level or any ancestor expires.
    fn effective_deadline(&self) -> Option<Instant> {
        let own = self.expiry.map(|e| e.at);
        let inherited = self.parent.as_ref().and_then(|p| p.effective_deadline());
        match (own, inherited) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// One-shot deadline / cancellation signal.
///
/// Cheap to clone; all clones observe the same state. Pass a clone (or its
/// [`token`](Deadline::token)) to every unit that should stop when it fires.
#[derive(Clone)]
pub struct Deadline {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Deadline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deadline")
            .field("deadline", &self.deadline())
            .field("cause", &self.inner.cause())
            .finish()
    }
}

impl Deadline {
    /// Creates a deadline that fires after `timeout`, or earlier when cancelled.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime (the timer is a spawned task).
    pub fn with_timeout(timeout: Duration) -> (Deadline, CancelHandle) {
        Self::build(Some(timeout), None)
    }

    /// Creates a deadline without a timer; it fires only when cancelled.
    pub fn with_cancel() -> (Deadline, CancelHandle) {
        Self::build(None, None)
    }

    /// A deadline that never fires. Useful where a context is required but
    /// no bound applies.
    pub fn background() -> Deadline {
        Deadline {
            inner: Inner::new(None, None),
        }
    }

    /// Derives a child that also fires after `timeout`.
    ///
    /// The child fires when the parent fires (inheriting its cause), when its
    /// own timer elapses, or when its own handle is cancelled. Cancelling the
    /// child never affects the parent.
    pub fn child_with_timeout(&self, timeout: Duration) -> (Deadline, CancelHandle) {
        Self::build(Some(timeout), Some(Arc::clone(&self.inner)))
    }

    /// Derives a child without its own timer.
    pub fn child(&self) -> (Deadline, CancelHandle) {
        Self::build(None, Some(Arc::clone(&self.inner)))
    }

    fn build(timeout: Option<Duration>, parent: Option<Arc<Inner>>) -> (Deadline, CancelHandle) {
        // A timeout past the clock's range never elapses; treat it as untimed.
        let expiry = timeout.and_then(|timeout| {
            Instant::now()
                .checked_add(timeout)
                .map(|at| Expiry { at, timeout })
        });
        let inner = Inner::new(expiry, parent);
        if let Some(exp) = expiry {
            spawn_timer(Arc::downgrade(&inner), inner.token.clone(), exp);
        }
        let handle = CancelHandle {
            owner: Arc::new(HandleOwner {
                inner: Arc::clone(&inner),
            }),
        };
        (Deadline { inner }, handle)
    }

    /// Returns `true` once the deadline has fired. Never blocks.
    pub fn is_fired(&self) -> bool {
        self.inner.expire_if_due(Instant::now());
        self.inner.token.is_cancelled()
    }

    /// Returns why the deadline fired, or `None` while it is still active.
    pub fn cause(&self) -> Option<DeadlineError> {
        self.inner.expire_if_due(Instant::now());
        self.inner.cause()
    }

    /// Waits until the deadline fires and returns its cause.
    ///
    /// Every concurrent waiter is released; waiting on an already fired
    /// deadline returns immediately.
    pub async fn done(&self) -> DeadlineError {
        loop {
            if let Some(cause) = self.cause() {
                return cause;
            }
            match self.deadline() {
                Some(at) => {
                    tokio::select! {
                        biased;
                        _ = self.inner.token.cancelled() => {}
                        _ = time::sleep_until(at) => {}
                    }
                }
                None => self.inner.token.cancelled().await,
            }
        }
    }

    /// Races `fut` against the deadline.
    ///
    /// When both are ready at the same time the deadline wins, so a caller
    /// never proceeds past an expired deadline.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, DeadlineError> {
        if let Some(cause) = self.cause() {
            return Err(cause);
        }
        tokio::pin!(fut);
        tokio::select! {
            biased;
            cause = self.done() => Err(cause),
            out = &mut fut => Ok(out),
        }
    }

    /// Instant at which the deadline (or any ancestor) expires, if timed.
    pub fn deadline(&self) -> Option<Instant> {
        self.inner.effective_deadline()
    }

    /// Time left before expiry; `Some(ZERO)` once passed, `None` if untimed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline()
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Cancellation token that is cancelled when the deadline fires.
    ///
    /// Hand it to code that only understands `CancellationToken`.
    pub fn token(&self) -> CancellationToken {
        self.inner.token.clone()
    }
}

/// Sleeps until `exp.at` and fires the deadline, unless it fires first.
fn spawn_timer(inner: Weak<Inner>, token: CancellationToken, exp: Expiry) {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = time::sleep_until(exp.at) => {
                if let Some(inner) = inner.upgrade() {
                    inner.fire(DeadlineError::Exceeded { timeout: exp.timeout });
                }
            }
        }
    });
}

struct HandleOwner {
    inner: Arc<Inner>,
}

impl Drop for HandleOwner {
    fn drop(&mut self) {
        self.inner.fire(DeadlineError::Cancelled);
    }
}

/// Owner-side handle that cancels a [`Deadline`].
///
/// `cancel` is idempotent. Dropping the last clone cancels as well, which
/// releases the background timer; binding the handle to `_` therefore cancels
/// the deadline immediately.
#[must_use = "dropping the handle cancels the deadline"]
#[derive(Clone)]
pub struct CancelHandle {
    owner: Arc<HandleOwner>,
}

impl CancelHandle {
    /// Fires the deadline with [`DeadlineError::Cancelled`] unless it already fired.
    pub fn cancel(&self) {
        self.owner.inner.fire(DeadlineError::Cancelled);
    }
}

impl std::fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelHandle").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_fires_on_timeout() {
        let (ctx, _cancel) = Deadline::with_timeout(Duration::from_millis(150));
        assert!(!ctx.is_fired());
        assert_eq!(ctx.cause(), None);

        let cause = ctx.done().await;
        assert_eq!(
            cause,
            DeadlineError::Exceeded {
                timeout: Duration::from_millis(150)
            }
        );
        assert!(ctx.is_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let (ctx, cancel) = Deadline::with_timeout(Duration::from_secs(10));
        cancel.cancel();
        let first = ctx.cause();
        for _ in 0..100 {
            cancel.cancel();
        }
        assert_eq!(first, Some(DeadlineError::Cancelled));
        assert_eq!(ctx.cause(), first);

        // The timer elapsing later must not rewrite the cause.
        time::sleep(Duration::from_secs(11)).await;
        assert_eq!(ctx.cause(), Some(DeadlineError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcast_releases_every_waiter_once() {
        let (ctx, cancel) = Deadline::with_cancel();
        let released = Arc::new(AtomicUsize::new(0));

        let mut waiters = Vec::new();
        for _ in 0..8 {
            let ctx = ctx.clone();
            let released = Arc::clone(&released);
            waiters.push(tokio::spawn(async move {
                let cause = ctx.done().await;
                released.fetch_add(1, Ordering::SeqCst);
                cause
            }));
        }
        tokio::task::yield_now().await;
        assert_eq!(released.load(Ordering::SeqCst), 0);

        cancel.cancel();
        cancel.cancel();
        for w in waiters {
            assert_eq!(w.await.unwrap(), DeadlineError::Cancelled);
        }
        assert_eq!(released.load(Ordering::SeqCst), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels() {
        let (ctx, cancel) = Deadline::with_timeout(Duration::from_secs(5));
        let clone = cancel.clone();
        drop(cancel);
        assert!(!ctx.is_fired());
        drop(clone);
        assert_eq!(ctx.cause(), Some(DeadlineError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_inherits_parent_cause() {
        let (parent, _pc) = Deadline::with_timeout(Duration::from_millis(100));
        let (child, _cc) = parent.child_with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());

        let cause = child.done().await;
        assert_eq!(
            cause,
            DeadlineError::Exceeded {
                timeout: Duration::from_millis(100)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_child_cancel_does_not_touch_parent() {
        let (parent, _pc) = Deadline::with_cancel();
        let (child, cc) = parent.child();
        cc.cancel();
        assert!(child.is_fired());
        assert!(!parent.is_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_prefers_deadline_on_tie() {
        let (ctx, _cancel) = Deadline::with_timeout(Duration::from_millis(50));
        let res = ctx.run(time::sleep(Duration::from_millis(50))).await;
        assert!(matches!(res, Err(DeadlineError::Exceeded { .. })));

        let (ctx, _cancel) = Deadline::with_timeout(Duration::from_millis(50));
        let res = ctx.run(async { 7 }).await;
        assert_eq!(res, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_never_fires() {
        let ctx = Deadline::background();
        time::sleep(Duration::from_secs(3600)).await;
        assert!(!ctx.is_fired());
        assert_eq!(ctx.remaining(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_timeout_is_untimed() {
        let (ctx, cancel) = Deadline::with_timeout(Duration::MAX);
        assert!(!ctx.is_fired());
        assert_eq!(ctx.remaining(), None);

        let (child, _child_cancel) = ctx.child_with_timeout(Duration::from_secs(u64::MAX / 2));
        time::sleep(Duration::from_secs(3600)).await;
        assert!(!child.is_fired());
        assert_eq!(child.remaining(), None);

        cancel.cancel();
        assert_eq!(child.cause(), Some(DeadlineError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_is_pending_until_fired() {
        let (ctx, cancel) = Deadline::with_cancel();
        let mut done = tokio_test::task::spawn(ctx.done());
        tokio_test::assert_pending!(done.poll());

        cancel.cancel();
        assert!(done.is_woken());
        tokio_test::assert_ready_eq!(done.poll(), DeadlineError::Cancelled);
    }
}
