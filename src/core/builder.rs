use std::sync::Arc;

use super::pool::WorkerPool;
use crate::config::PoolConfig;
use crate::events::{Bus, Emitter};
use crate::handlers::HandlerRef;

/// Builder for a [`WorkerPool`] with optional features.
pub struct PoolBuilder {
    cfg: PoolConfig,
    bus: Option<Bus>,
}

impl PoolBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: PoolConfig) -> Self {
        Self { cfg, bus: None }
    }

    /// Publishes worker lifecycle events to `bus`.
    ///
    /// Pair it with a [`SubscriberSet`](crate::SubscriberSet) listening on the
    /// same bus to log or count them.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Spawns the workers and returns the running pool.
    pub fn build<T: Send + 'static>(self, handler: HandlerRef<T>) -> WorkerPool<T> {
        let mut emitter = Emitter::new(Arc::<str>::from(self.cfg.name.as_ref()));
        if let Some(bus) = self.bus {
            emitter.set_bus(bus);
        }
        WorkerPool::start(self.cfg, handler, emitter)
    }
}
