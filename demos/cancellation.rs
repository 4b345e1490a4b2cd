//! # Example: cancellation
//!
//! Walking away from work that cannot be interrupted. The unit simulates
//! blocking I/O of up to 200ms while the caller only waits 150ms. The
//! unit's result slot is reserved before it starts, so its late write never
//! blocks and nothing leaks.
//!
//! ## Flow
//! ```text
//! Deadline::with_timeout(150ms) ──► (deadline, cancel handle)
//! spawn_abandonable(io)         ──► ResultSlot
//! slot.wait_until(&deadline)
//!   ├─ Ok(Some(data)) → "work complete"
//!   └─ Err(cause)     → "work cancelled"
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example cancellation -- 7      # optional seed
//! ```

use std::time::Duration;

use corral::{Deadline, spawn_abandonable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[tokio::main]
async fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    let mut rng = StdRng::seed_from_u64(seed);

    // The handle cancels the deadline when dropped; keep it for the whole scope.
    let (deadline, _cancel) = Deadline::with_timeout(Duration::from_millis(150));

    let io_time = rng.random_range(0..200u64);
    println!("workload io time: {io_time} ms");
    let slot = spawn_abandonable(async move {
        tokio::time::sleep(Duration::from_millis(io_time)).await;
        "data"
    });

    match slot.wait_until(&deadline).await {
        Ok(Some(d)) => println!("work complete {d}"),
        Ok(None) => println!("work lost"),
        Err(cause) => println!("work cancelled: {cause}"),
    }

    tokio::time::sleep(Duration::from_millis(100)).await;
    println!("---------------------------------");
}
