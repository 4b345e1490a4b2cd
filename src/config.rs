//! # Pool configuration.
//!
//! Provides [`PoolConfig`], the settings a [`WorkerPool`](crate::WorkerPool)
//! is built from.
//!
//! ## Sentinel values
//! - `workers = 0` → one worker per available hardware thread
//! - `capacity = 0` → rendezvous hand-off (no buffering)
//! - `grace = 0s` → `shutdown_with_grace` waits without bound

use std::borrow::Cow;
use std::num::NonZeroUsize;
use std::time::Duration;

/// Configuration for a worker pool.
///
/// ## Field semantics
/// - `name`: label attached to every event the pool publishes
/// - `workers`: fixed worker count (`0` = available parallelism)
/// - `capacity`: channel capacity (`0` = rendezvous)
/// - `grace`: maximum wait in `shutdown_with_grace` (`0s` = unbounded)
///
/// ## Choosing a capacity
/// Keep `capacity = 0` whenever the producer may later need to bound or
/// cancel a submission: with a rendezvous channel a successful submit means a
/// worker holds the item. A buffer smooths throughput but gives up that
/// guarantee.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Label used as the event source.
    pub name: Cow<'static, str>,

    /// Number of workers.
    ///
    /// - `0` = `std::thread::available_parallelism()`
    /// - `n > 0` = exactly `n` workers
    pub workers: usize,

    /// Capacity of the shared hand-off channel.
    pub capacity: usize,

    /// Maximum time to wait for workers to drain during graceful shutdown.
    pub grace: Duration,
}

impl PoolConfig {
    /// Returns the effective worker count (never 0).
    #[inline]
    pub fn worker_count(&self) -> usize {
        match self.workers {
            0 => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            n => n,
        }
    }

    /// Returns the shutdown grace as an `Option`.
    ///
    /// - `None` → wait for workers without bound
    /// - `Some(d)` → give up after `d`
    #[inline]
    pub fn grace_limit(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `name = "pool"`
    /// - `workers = 0` (available parallelism)
    /// - `capacity = 0` (rendezvous)
    /// - `grace = 60s`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("pool"),
            workers: 0,
            capacity: 0,
            grace: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        let cfg = PoolConfig {
            grace: Duration::ZERO,
            ..PoolConfig::default()
        };
        assert!(cfg.worker_count() >= 1);
        assert_eq!(cfg.grace_limit(), None);

        let cfg = PoolConfig {
            workers: 3,
            ..PoolConfig::default()
        };
        assert_eq!(cfg.worker_count(), 3);
        assert_eq!(cfg.grace_limit(), Some(Duration::from_secs(60)));
    }
}
