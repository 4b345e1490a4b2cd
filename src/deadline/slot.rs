//! # Pre-allocated result slot for abandonable units.
//!
//! A unit blocked in work that cannot be interrupted (a blocking call, a
//! third-party future without cancellation) still has to deliver its result
//! somewhere. [`spawn_abandonable`] allocates a single-slot channel **before**
//! the unit starts, so the unit's final write never blocks even when the
//! waiter already walked away on its deadline.
//!
//! ```text
//! waiter ──► spawn_abandonable(work) ──► [oneshot slot] ◄── unit writes once
//!    │
//!    └──► wait_until(deadline) ──► Ok(value)            (unit finished first)
//!                               └─► Err(DeadlineError)  (deadline first; slot is
//!                                                        dropped, late write is a no-op)
//! ```

use std::future::Future;

use tokio::sync::oneshot;

use crate::deadline::Deadline;
use crate::error::DeadlineError;

/// Receiving end of a pre-allocated single-slot result.
#[derive(Debug)]
pub struct ResultSlot<T> {
    rx: oneshot::Receiver<T>,
}

/// Spawns `fut` on the runtime with a result slot reserved for its output.
///
/// The spawned unit is never cancelled by the slot; abandoning the slot only
/// means its result is discarded when it eventually arrives.
pub fn spawn_abandonable<F>(fut: F) -> ResultSlot<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let out = fut.await;
        if tx.send(out).is_err() {
            tracing::trace!("result slot abandoned; late result discarded");
        }
    });
    ResultSlot { rx }
}

impl<T> ResultSlot<T> {
    /// Waits for the unit's result with no bound.
    ///
    /// Returns `None` if the unit terminated without producing one (panic).
    pub async fn wait(self) -> Option<T> {
        self.rx.await.ok()
    }

    /// Waits for the result or the deadline, whichever comes first.
    ///
    /// - `Ok(Some(v))`: the unit delivered in time;
    /// - `Ok(None)`: the unit died without delivering;
    /// - `Err(cause)`: the deadline fired first (ties go to the deadline).
    pub async fn wait_until(self, deadline: &Deadline) -> Result<Option<T>, DeadlineError> {
        deadline.run(self.rx).await.map(Result::ok)
    }

    /// Takes the result if it is already available. Never blocks.
    pub fn try_take(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}
