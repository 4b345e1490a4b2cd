//! # WorkerPool: fixed workers draining one shared hand-off channel.
//!
//! The [`WorkerPool`] spawns `size` workers at construction. They all
//! receive from the same [`channel`](crate::channel()), so every submitted
//! item is handled by exactly one worker. Closing the channel is the stop
//! signal; workers drain what is left and exit, and a [`CompletionTracker`]
//! armed with `size` participants tells the owner when all of them are gone.
//!
//! ## Architecture
//! ```text
//! submit(item) ──► Sender ──► [hand-off channel] ──┬──► worker 0 ──► handler
//!                                                  ├──► worker 1 ──► handler
//!                                                  └──► worker N ──► handler
//!
//! shutdown():
//!   close() ──► workers see None after draining ──► guards drop ──► wait() returns
//!
//! shutdown_with_grace(d):
//!   close() ──► timeout(d, wait())
//!                 ├─ Ok      → Ok(())
//!                 └─ elapsed → GraceExceeded { stuck: non-terminated workers }
//! ```
//!
//! ## Rules
//! - Workers are spawned at construction; a Tokio runtime must be running
//! - With the default rendezvous channel, `submit` returns once a worker holds the item
//! - `close()` is idempotent; submitting afterwards fails with [`PoolError::Closed`]
//! - Workers that exceed the grace are not aborted; they keep running detached
//!
//! ## Example
//! ```rust
//! use corral::{HandlerFn, WorkerPool};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), corral::PoolError> {
//!     let pool = WorkerPool::new(4, HandlerFn::arc(|item: &'static str| async move {
//!         println!("received work {item}");
//!     }));
//!     for item in ["a", "b", "c", "d", "e"] {
//!         pool.submit(item).await?;
//!     }
//!     pool.shutdown().await;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use super::builder::PoolBuilder;
use super::completion::CompletionTracker;
use super::states::{WorkerState, WorkerStates};
use super::worker::Worker;
use crate::channel::{self, SendTimeoutError, Sender, TrySendError};
use crate::config::PoolConfig;
use crate::deadline::Deadline;
use crate::error::PoolError;
use crate::events::{Emitter, EventKind};
use crate::handlers::HandlerRef;

/// A fixed-size pool of workers sharing one hand-off channel.
pub struct WorkerPool<T> {
    tx: Sender<T>,
    completion: CompletionTracker,
    states: Arc<WorkerStates>,
    emitter: Emitter,
    cfg: PoolConfig,
    size: usize,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Starts `size` workers (0 = available parallelism) on a rendezvous channel.
    pub fn new(size: usize, handler: HandlerRef<T>) -> Self {
        Self::with_config(
            PoolConfig {
                workers: size,
                ..PoolConfig::default()
            },
            handler,
        )
    }

    /// Starts a pool from an explicit configuration.
    pub fn with_config(cfg: PoolConfig, handler: HandlerRef<T>) -> Self {
        PoolBuilder::new(cfg).build(handler)
    }

    /// Returns a builder for pools that publish events.
    pub fn builder(cfg: PoolConfig) -> PoolBuilder {
        PoolBuilder::new(cfg)
    }

    pub(crate) fn start(cfg: PoolConfig, handler: HandlerRef<T>, emitter: Emitter) -> Self {
        let size = cfg.worker_count();
        let (tx, rx) = channel::channel::<T>(cfg.capacity);
        let (completion, guards) = CompletionTracker::armed(size);
        let states = Arc::new(WorkerStates::new(size));

        for (id, guard) in guards.into_iter().enumerate() {
            let worker = Worker {
                id,
                rx: rx.clone(),
                handler: Arc::clone(&handler),
                states: Arc::clone(&states),
                emitter: emitter.clone(),
            };
            tokio::spawn(worker.run(guard));
        }
        tracing::debug!(pool = emitter.source(), size, capacity = cfg.capacity, "pool started");

        Self {
            tx,
            completion,
            states,
            emitter,
            cfg,
            size,
        }
    }

    /// Hands `item` to the pool, waiting for a worker (or a buffer slot).
    ///
    /// Fails with [`PoolError::Closed`] after [`close`](Self::close).
    pub async fn submit(&self, item: T) -> Result<(), PoolError> {
        self.tx.send(item).await.map_err(|_| {
            tracing::warn!(pool = self.emitter.source(), "submit on closed pool");
            PoolError::Closed
        })
    }

    /// Hands `item` to the pool only if that can happen without waiting.
    ///
    /// The item comes back inside the error when the pool is busy or closed.
    pub fn try_submit(&self, item: T) -> Result<(), TrySendError<T>> {
        self.tx.try_send(item)
    }

    /// Like [`submit`](Self::submit), but gives up once `deadline` fires.
    ///
    /// An abandoned submission is never handled by a worker.
    pub async fn submit_until(&self, item: T, deadline: &Deadline) -> Result<(), PoolError> {
        match self.tx.send_until(item, deadline).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Closed(_)) => Err(PoolError::Closed),
            Err(SendTimeoutError::Abandoned { cause, .. }) => {
                tracing::debug!(pool = self.emitter.source(), %cause, "submission abandoned");
                Err(PoolError::Abandoned { cause })
            }
        }
    }

    /// A raw sender into the pool's channel, for producers that want their
    /// items back on failure.
    pub fn submitter(&self) -> Sender<T> {
        self.tx.clone()
    }

    /// Closes the pool to new work. Idempotent.
    pub fn close(&self) {
        if self.tx.close() {
            self.emitter.emit(EventKind::PoolClosed, |ev| ev);
            tracing::debug!(pool = self.emitter.source(), "pool closed");
        }
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Waits until every worker has exited. Does not close the pool.
    pub async fn wait(&self) {
        self.completion.wait().await;
    }

    /// Closes the pool and waits for every worker to drain and exit.
    pub async fn shutdown(&self) {
        self.close();
        self.wait().await;
    }

    /// Closes the pool and waits at most `grace` for the workers.
    ///
    /// On timeout, returns [`PoolError::GraceExceeded`] with the ids of the
    /// workers still running.
    pub async fn shutdown_with_grace(&self, grace: Duration) -> Result<(), PoolError> {
        self.close();
        match tokio::time::timeout(grace, self.completion.wait()).await {
            Ok(()) => Ok(()),
            Err(_elapsed) => {
                let stuck = self.states.running();
                let n = stuck.len() as u64;
                self.emitter.emit(EventKind::GraceExceeded, |ev| ev.with_count(n));
                tracing::warn!(pool = self.emitter.source(), ?grace, ?stuck, "shutdown grace exceeded");
                Err(PoolError::GraceExceeded { grace, stuck })
            }
        }
    }

    /// [`shutdown_with_grace`](Self::shutdown_with_grace) with the configured
    /// grace, or an unbounded [`shutdown`](Self::shutdown) when it is zero.
    pub async fn shutdown_graceful(&self) -> Result<(), PoolError> {
        match self.cfg.grace_limit() {
            Some(grace) => self.shutdown_with_grace(grace).await,
            None => {
                self.shutdown().await;
                Ok(())
            }
        }
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Snapshot of every worker's state, indexed by worker id.
    pub fn states(&self) -> Vec<WorkerState> {
        self.states.snapshot()
    }

    /// The configuration this pool was started with.
    pub fn config(&self) -> &PoolConfig {
        &self.cfg
    }
}

impl<T> std::fmt::Debug for WorkerPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.cfg.name)
            .field("size", &self.size)
            .field("completion", &self.completion)
            .finish()
    }
}
