//! # Example: pooling
//!
//! A fixed pool of workers, one per hardware thread, serving a rendezvous
//! channel. Each `submit` returns only once some worker holds the item, so
//! the producer could bound or cancel any send later on.
//!
//! ## Flow
//! ```text
//! WorkerPool::new(0, handler)        (0 = available parallelism)
//!   ├─► submit("data") × 100         (blocks until a worker receives)
//!   ├─► close()                      (workers see the shutdown signal)
//!   └─► wait()                       (every worker has exited)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example pooling
//! ```

use corral::{HandlerFn, WorkerPool, WorkerState};

const WORK: usize = 100;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pool = WorkerPool::new(
        0,
        HandlerFn::arc(|(w, data): (usize, &'static str)| async move {
            println!("child: recv'd signal {w}: {data}");
        }),
    );
    println!("pool of {} workers", pool.size());

    for w in 0..WORK {
        pool.submit((w, "data")).await?;
        println!("parent: sent signal: {w}");
    }

    pool.close();
    println!("parent: sent shutdown signal");
    pool.wait().await;

    let terminated = pool
        .states()
        .iter()
        .filter(|s| **s == WorkerState::Terminated)
        .count();
    println!("{terminated} workers recv'd shutdown signal");
    Ok(())
}
