//! # Fan-out / fan-in collector.
//!
//! Spawns one task per item, lets each compute a result, and gathers exactly
//! as many results as there were items. The result channel is sized to the
//! number of items, so a unit never waits on the collector.
//!
//! ## Architecture
//! ```text
//! items[0] ──► spawn unit 0 ──┐
//! items[1] ──► spawn unit 1 ──┼──► [channel, capacity N] ──► collector: remaining N → 0
//! items[N] ──► spawn unit N ──┘
//! ```
//!
//! ## Rules
//! - Results arrive in completion order; each carries the `index` of its item
//! - A unit that panics drops its sender; the collector notices once every
//!   sender is gone and reports [`FanOutError::Lost`](crate::FanOutError::Lost)
//!   instead of hanging
//! - Width is unbounded unless capped with [`FanOut::with_max_concurrent`]
//!
//! ## Example
//! ```rust
//! use corral::fanout;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), corral::FanOutError> {
//!     let mut results = fanout::run(vec![1u64, 2, 3], |n| async move { n * n }).await?;
//!     results.sort_by_key(|r| r.index);
//!     let squares: Vec<u64> = results.into_iter().map(|r| r.value).collect();
//!     assert_eq!(squares, vec![1, 4, 9]);
//!     Ok(())
//! }
//! ```

mod collector;

pub use collector::{FanOut, FanOutResult, run};
