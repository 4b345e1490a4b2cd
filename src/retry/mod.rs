//! # Retry loops bounded by a deadline.
//!
//! A retry loop keeps invoking a check until it succeeds, fails fatally, or
//! the [`Deadline`](crate::Deadline) it runs under fires. Total time is
//! bounded by the deadline, never by an attempt count.
//!
//! ## Loop
//! ```text
//! loop {
//!   ├─► attempt += 1, check(&deadline)
//!   │     ├─ Ok(v)    → return Ok(v)
//!   │     └─ Fatal(e) → return Fatal
//!   ├─► deadline fired?          → return DeadlineExceeded / Cancelled
//!   ├─► delay = backoff.pause_after(..)
//!   └─► select! { biased;
//!         deadline.done() → return DeadlineExceeded / Cancelled
//!         sleep(delay)    → deadline fired in the same instant? → return it
//!       }
//! }
//! ```
//!
//! ## Rules
//! - At least one attempt is made, even under an already-fired deadline
//! - A delay ending together with the deadline reports the deadline
//! - The check receives the deadline and is responsible for honouring it
//!
//! - [`run`] the plain fixed-interval loop
//! - [`Retry`] the configurable loop (backoff, seeded jitter, events)

mod retry_loop;

pub use retry_loop::{Retry, run};
