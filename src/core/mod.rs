//! Worker pool core: workers, lifecycle and shutdown coordination.
//!
//! The only entry points are [`WorkerPool`], its [`PoolBuilder`], and the
//! standalone [`CompletionTracker`] barrier the pool uses internally.
//!
//! Internal modules:
//! - [`pool`]: owns the channel, spawns workers, drives shutdown;
//! - [`worker`]: one receive loop per worker with panic isolation;
//! - [`completion`]: pre-armed counting barrier with drop-guards;
//! - [`states`]: per-worker lifecycle cells for snapshots and stuck reports.

mod builder;
mod completion;
mod pool;
mod states;
mod worker;

pub use builder::PoolBuilder;
pub use completion::{CompletionGuard, CompletionTracker};
pub use pool::WorkerPool;
pub use states::WorkerState;
