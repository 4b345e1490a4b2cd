//! # Example: wait_for_task
//!
//! The building block of pooling: a child waits on a rendezvous channel for
//! the parent to hand it work. The send completes only once the child holds
//! the item.
//!
//! ## Run
//! ```bash
//! cargo run --example wait_for_task
//! ```

use std::time::Duration;

use corral::channel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (tx, rx) = channel::<&'static str>(0);
    let mut rng = StdRng::seed_from_u64(500);

    let child = tokio::spawn(async move {
        if let Some(d) = rx.recv().await {
            println!("child: recv'd signal: {d}");
        }
    });

    tokio::time::sleep(Duration::from_millis(rng.random_range(0..500))).await;
    tx.send("data").await?;
    println!("parent: sent signal");

    child.await?;
    Ok(())
}
