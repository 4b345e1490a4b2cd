//! # Pool worker: one receive loop per worker.
//!
//! Each worker pulls items from the shared hand-off channel and runs the
//! handler on them, one at a time, until the channel is closed and drained.
//!
//! ## Loop
//! ```text
//! publish WorkerStarted
//! loop {
//!   ├─► rx.recv()            None → break (closed & drained)
//!   ├─► state = Processing
//!   ├─► handler.handle(item) panic → HandlerPanicked, keep going
//!   └─► state = Idle
//! }
//! publish WorkerStopped(count)
//! ExitGuard::drop → state = Terminated → CompletionGuard signals
//! ```
//!
//! ## Rules
//! - Items on one worker are handled **sequentially**
//! - A panicking handler costs one item, never the worker
//! - Completion is signalled on **every** exit path, unwinding included

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::completion::CompletionGuard;
use super::states::{WorkerState, WorkerStates};
use crate::channel::Receiver;
use crate::events::{Emitter, EventKind};
use crate::handlers::HandlerRef;
use crate::subscribers::panic_message;

pub(crate) struct Worker<T> {
    pub(crate) id: usize,
    pub(crate) rx: Receiver<T>,
    pub(crate) handler: HandlerRef<T>,
    pub(crate) states: Arc<WorkerStates>,
    pub(crate) emitter: Emitter,
}

/// Marks the worker terminated, then releases its completion guard.
struct ExitGuard {
    id: usize,
    states: Arc<WorkerStates>,
    _completion: CompletionGuard,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.states.set(self.id, WorkerState::Terminated);
    }
}

impl<T: Send + 'static> Worker<T> {
    pub(crate) async fn run(self, completion: CompletionGuard) {
        let _exit = ExitGuard {
            id: self.id,
            states: Arc::clone(&self.states),
            _completion: completion,
        };
        let id = self.id;
        self.emitter
            .emit(EventKind::WorkerStarted, |ev| ev.with_worker(id));
        tracing::trace!(pool = self.emitter.source(), worker = id, "worker started");

        let mut handled: u64 = 0;
        while let Some(item) = self.rx.recv().await {
            self.states.set(id, WorkerState::Processing);
            let handler = &self.handler;
            let res = AssertUnwindSafe(async move { handler.handle(item).await })
                .catch_unwind()
                .await;
            if let Err(payload) = res {
                let info = panic_message(payload.as_ref());
                tracing::error!(pool = self.emitter.source(), worker = id, panic = %info, "handler panicked");
                self.emitter.emit(EventKind::HandlerPanicked, |ev| {
                    ev.with_worker(id).with_reason(info)
                });
            }
            handled += 1;
            self.states.set(id, WorkerState::Idle);
        }

        self.emitter.emit(EventKind::WorkerStopped, |ev| {
            ev.with_worker(id).with_count(handled)
        });
        tracing::trace!(pool = self.emitter.source(), worker = id, handled, "worker stopped");
    }
}
