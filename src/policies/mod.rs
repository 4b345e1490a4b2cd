//! Retry delay policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] pause after each failure (interval / growth / ceiling + jitter)
//! - [`JitterPolicy`]  randomization strategy to avoid synchronized retries
//!
//! ## Quick wiring
//! ```text
//! Retry::new(BackoffPolicy)
//!      └─► after failed attempt n: backoff.pause_after(n, deadline.remaining(), &mut rng)
//!           └─► sleep(delay) raced against the deadline
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → fixed 100ms, jitter=None.
//! - `BackoffPolicy::fixed(d)` → exactly `d` between attempts.
//! - `JitterPolicy::None` by default; consider `Equal` for balanced randomness.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
