//! # corral
//!
//! **Corral** is a small toolkit of async coordination primitives for Tokio.
//!
//! It provides the pieces that keep concurrent work bounded and shut down
//! cleanly: a hand-off channel, worker pools with graceful shutdown,
//! non-blocking backpressure, deadlines with cancellation, deadline-bounded
//! retry loops and fan-out collectors. Each primitive stands alone; they
//! compose through the channel and the deadline.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producer                         producer
//!      │ submit / submit_until          │ try_send
//!      ▼                                ▼
//! ┌───────────────────┐          ┌───────────────────┐
//! │    WorkerPool     │          │ BackpressureGate  │──► DropPolicy (shed)
//! │ hand-off channel  │          │ bounded channel   │
//! └──┬──────┬──────┬──┘          └─────────┬─────────┘
//!    ▼      ▼      ▼                       ▼
//! worker  worker  worker               consumer
//!    │      │      │
//!    └──────┴──────┴──► CompletionTracker ──► shutdown / wait
//!
//! Deadline ──bounds──► Retry::run, submit_until, recv_until, ResultSlot::wait_until
//! FanOut   ──spawns──► N units ──► [channel N] ──► collector
//!
//! every primitive ──(optional)──► Bus ──► SubscriberSet ──► Subscribe (LogWriter, metrics)
//! ```
//!
//! ### Shutdown
//! ```text
//! pool.close() ──► channel closed ──► workers drain ──► recv() = None
//!                                                        └─► guard dropped
//! pool.wait()  ◄── tracker reaches zero ◄────────────────────┘
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Hand-off**      | Rendezvous or buffered MPMC channel with close semantics.      | [`channel()`], [`Sender`], [`Receiver`]     |
//! | **Pools**         | Fixed workers, per-item panic isolation, graceful shutdown.    | [`WorkerPool`], [`Handler`], [`HandlerFn`]  |
//! | **Backpressure**  | Never-blocking admission with an explicit drop policy.         | [`BackpressureGate`], [`DropPolicy`]        |
//! | **Deadlines**     | One-shot timeout/cancel signal with child scopes.              | [`Deadline`], [`CancelHandle`]              |
//! | **Retry**         | Deadline-bounded retry with backoff and seeded jitter.         | [`retry::run`], [`Retry`], [`BackoffPolicy`]|
//! | **Fan-out**       | One unit per item, exactly-N collection, optional width cap.   | [`fanout::run`], [`FanOut`]                 |
//! | **Events**        | Optional runtime events for logging and metrics.               | [`Bus`], [`Event`], [`Subscribe`]           |
//! | **Errors**        | Typed errors with stable labels.                               | [`PoolError`], [`RetryError`]               |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] that forwards events to `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use corral::{CheckError, Deadline, HandlerFn, WorkerPool, retry};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // A pool of four workers behind a rendezvous channel.
//!     let pool = WorkerPool::new(4, HandlerFn::arc(|item: &'static str| async move {
//!         println!("received work {item}");
//!     }));
//!     for item in ["a", "b", "c", "d", "e"] {
//!         pool.submit(item).await?;
//!     }
//!     pool.shutdown().await;
//!
//!     // A check retried every 50ms for at most one second.
//!     let (deadline, _cancel) = Deadline::with_timeout(Duration::from_secs(1));
//!     retry::run(&deadline, Duration::from_millis(50), |_| async {
//!         Ok::<_, CheckError>(())
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```
pub mod channel;
mod config;
mod core;
mod deadline;
mod error;
mod events;
pub mod fanout;
mod gate;
mod handlers;
mod policies;
pub mod retry;
mod subscribers;

// ---- Public re-exports ----

pub use channel::{Receiver, Sender, channel};
pub use config::PoolConfig;
pub use core::{CompletionGuard, CompletionTracker, PoolBuilder, WorkerPool, WorkerState};
pub use deadline::{CancelHandle, Deadline, ResultSlot, spawn_abandonable};
pub use error::{CheckError, DeadlineError, FanOutError, PoolError, RetryError};
pub use events::{Bus, Event, EventKind};
pub use fanout::{FanOut, FanOutResult};
pub use gate::{BackpressureGate, DropDecision, DropPolicy, DropReason, GateStats};
pub use handlers::{BoxHandlerFuture, Handler, HandlerFn, HandlerRef};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use retry::Retry;
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
