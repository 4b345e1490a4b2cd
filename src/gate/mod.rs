//! # Backpressure gate: non-blocking admission with explicit shedding.
//!
//! A [`BackpressureGate`] is a bounded hand-off channel whose producers never
//! wait. Each submission gets a [`DropDecision`]: the item was either
//! delivered into the buffer or dropped, never half-delivered. What happens
//! to a dropped item is decided by the gate's [`DropPolicy`].
//!
//! ## Architecture
//! ```text
//! try_send(item) ──► Sender::try_send ──┬─ Ok         → Delivered   (delivered += 1)
//!                                       ├─ Full(item)  → policy(item, Full)   → Dropped
//!                                       └─ Closed(item)→ policy(item, Closed) → Dropped
//! ```
//!
//! ## Rules
//! - `try_send` never blocks, whatever the burst size
//! - `delivered + dropped` always equals the number of submissions
//! - A drop is an expected outcome, not an error
//!
//! ## Example
//! ```rust
//! use corral::{BackpressureGate, DropDecision};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let (gate, rx) = BackpressureGate::new(1);
//!     assert_eq!(gate.try_send("first"), DropDecision::Delivered);
//!     assert_eq!(gate.try_send("second"), DropDecision::Dropped);
//!     assert_eq!(rx.recv().await, Some("first"));
//!
//!     let stats = gate.stats();
//!     assert_eq!((stats.delivered, stats.dropped), (1, 1));
//! }
//! ```

mod backpressure;
mod drop_policy;

pub use backpressure::{BackpressureGate, GateStats};
pub use drop_policy::{DropDecision, DropPolicy, DropReason};
