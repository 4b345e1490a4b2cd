//! # Example: bounded_work_pooling
//!
//! A pool draining a fixed, known amount of work through a buffer sized to
//! the worker count. Buffered items are flushed before the workers observe
//! the close.
//!
//! ## Flow
//! ```text
//! PoolConfig { workers: 0, capacity: g }
//!   ├─► submit("paper") × 2001
//!   └─► shutdown()      close + wait for all g workers
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example bounded_work_pooling
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use corral::{HandlerFn, PoolConfig, WorkerPool};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let work = vec!["paper"; 2001];

    let mut cfg = PoolConfig {
        name: "paper".into(),
        ..PoolConfig::default()
    };
    cfg.capacity = cfg.worker_count();

    let handled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&handled);
    let pool = WorkerPool::with_config(
        cfg,
        HandlerFn::arc(move |wrk: &'static str| {
            let counter = Arc::clone(&counter);
            async move {
                let n = counter.fetch_add(1, Ordering::Relaxed);
                println!("received work {n}: {wrk}");
            }
        }),
    );

    for wrk in work {
        pool.submit(wrk).await?;
    }
    pool.shutdown().await;

    println!(
        "{} workers done, {} items handled",
        pool.size(),
        handled.load(Ordering::Relaxed)
    );
    Ok(())
}
