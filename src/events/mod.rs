//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! Every primitive accepts an optional bus (`with_bus`). Without one, nothing
//! is published and the primitives only emit `tracing` diagnostics.

mod bus;
mod emitter;
mod event;

pub use bus::Bus;
pub(crate) use emitter::Emitter;
pub use event::{Event, EventKind};
