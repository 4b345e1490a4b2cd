//! # Example: fan_in_fan_out
//!
//! One task per piece of work, results gathered back by a counting
//! collector. Work durations come from a seeded generator so a run can be
//! replayed; arrival order still varies with scheduling.
//!
//! Fan-out multiplies tasks per request. The collector here caps the width
//! at 256 concurrent units.
//!
//! ## Flow
//! ```text
//! FanOut::new().with_max_concurrent(256).with_bus(bus)
//!   ├─► spawn unit 0..2000 ──► sleep(rand 0..200ms) ──► "data-{i}"
//!   ├─► collector: remaining 2000 → 0
//!   └─► publish(FanOutCompleted) ──► LogWriter
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=info cargo run --example fan_in_fan_out --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use corral::{Bus, FanOut, LogWriter, Subscribe, SubscriberSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

const CHILDREN: usize = 2000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let bus = Bus::default();
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let set = Arc::new(SubscriberSet::new(subs, bus.clone()));
    let listener = set.listen();

    // Draw every delay up front so the workload is reproducible.
    let mut rng = StdRng::seed_from_u64(2000);
    let work: Vec<(usize, u64)> = (0..CHILDREN)
        .map(|child| (child, rng.random_range(0..200)))
        .collect();

    let results = FanOut::new()
        .with_name("children")
        .with_max_concurrent(256)
        .with_bus(bus)
        .run(work, |(child, ms)| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            println!("child {child} sent signal.");
            format!("data-{child}")
        })
        .await?;

    for r in results.iter().take(10) {
        println!("received: {} (item {})", r.value, r.index);
    }
    println!("received {} results", results.len());

    tokio::time::sleep(Duration::from_millis(50)).await;
    listener.abort();
    println!("--------------------------------");
    Ok(())
}
