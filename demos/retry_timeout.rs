//! # Example: retry_timeout
//!
//! Pinging a dependency that keeps failing, retrying at a fixed interval
//! until a deadline gives up on it. Attempt events go through `tracing`.
//!
//! ## Flow
//! ```text
//! Deadline::with_timeout(3s)
//! retry::run(&deadline, 1s, db_health_check)
//!   ├─► check → Err("ping error")
//!   ├─► deadline fired?     no
//!   ├─► wait 1s (raced against the deadline)
//!   └─► ... → Err(DeadlineExceeded { attempts: 3, last: "ping error" })
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=corral=trace cargo run --example retry_timeout
//! ```

use std::time::Duration;

use corral::{CheckError, Deadline, retry};
use tracing_subscriber::EnvFilter;

async fn db_health_check(deadline: Deadline) -> Result<(), CheckError> {
    println!("performing user check call...");
    if deadline.is_fired() {
        return Err(CheckError::fail("ping skipped"));
    }
    Err(CheckError::fail("ping error"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("call retry_timeout");
    let (deadline, _cancel) = Deadline::with_timeout(Duration::from_secs(3));

    match retry::run(&deadline, Duration::from_secs(1), |dl: &Deadline| db_health_check(dl.clone())).await {
        Ok(()) => println!("work finished successfully"),
        Err(err) => println!(
            "time expired after {} attempt(s): {err} [{}]",
            err.attempts(),
            err.as_label()
        ),
    }
}
