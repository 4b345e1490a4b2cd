//! # Example: wait_for_result
//!
//! The reverse hand-off: the parent blocks on a rendezvous channel until
//! a child finishes its work of unknown duration and signals the result.
//!
//! ## Run
//! ```bash
//! cargo run --example wait_for_result
//! ```

use std::time::Duration;

use corral::channel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[tokio::main]
async fn main() {
    let (tx, rx) = channel::<&'static str>(0);
    let delay = StdRng::seed_from_u64(7).random_range(0..500);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if tx.send("data payload").await.is_ok() {
            println!("child: sent signal");
        }
    });

    if let Some(d) = rx.recv().await {
        println!("parent: recvd signal: {d}");
    }
    println!("---------------------------------------");
}
