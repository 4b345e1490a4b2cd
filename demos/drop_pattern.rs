//! # Example: drop_pattern
//!
//! A service at capacity sheds load instead of blocking its callers. One
//! slow consumer drains a gate of 100 while the producer fires 2000 items
//! without ever waiting; every overflow goes to the drop handler.
//!
//! ## Flow
//! ```text
//! BackpressureGate::new(100)
//!   ├─► consumer: rx.recv() loop
//!   ├─► try_send(w) × 2000 ──► Delivered | Dropped → DropPolicy::Handler
//!   └─► close() ──► consumer drains and stops
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example drop_pattern
//! ```

use std::time::Duration;

use corral::{BackpressureGate, DropDecision, DropPolicy, DropReason};

const CAPACITY: usize = 100;
const WORK: usize = 2000;

#[tokio::main]
async fn main() {
    let (gate, rx) = BackpressureGate::<usize>::new(CAPACITY);
    let gate = gate
        .with_name("ingest")
        .with_policy(DropPolicy::handler(|w: usize, reason: DropReason| {
            println!("parent: dropped data {w} ({})", reason.as_label());
        }));

    let consumer = tokio::spawn(async move {
        while let Some(p) = rx.recv().await {
            println!("child: recv'd signal: {p}");
            tokio::time::sleep(Duration::from_micros(50)).await;
        }
    });

    for w in 0..WORK {
        if gate.try_send(w) == DropDecision::Delivered {
            println!("parent: sent signal: {w}");
        }
        if w % 100 == 0 {
            tokio::task::yield_now().await;
        }
    }

    gate.close();
    println!("parent: sent shutdown signal");
    let _ = consumer.await;

    let stats = gate.stats();
    println!("delivered={} dropped={}", stats.delivered, stats.dropped);
}
