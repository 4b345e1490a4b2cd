//! Deadlines, cancellation and abandonable results.
//!
//! ## Contents
//! - [`Deadline`], [`CancelHandle`] one-shot deadline/cancel signal
//! - [`ResultSlot`], [`spawn_abandonable`] single-slot result for units that
//!   cannot be interrupted

mod context;
mod slot;

pub use context::{CancelHandle, Deadline};
pub use slot::{ResultSlot, spawn_abandonable};
