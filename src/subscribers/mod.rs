//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! that fans bus events out to subscribers.
//!
//! ## Architecture
//! ```text
//! WorkerPool / BackpressureGate / Retry / FanOut
//!        │ publish(Event)
//!        ▼
//!       Bus ──► SubscriberSet::listen() ──► per-subscriber queue ──► Subscribe::on_event
//!                                                                      ├─► LogWriter (tracing)
//!                                                                      └─► custom (metrics, alerts)
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use corral::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct DropCounter;
//!
//! #[async_trait]
//! impl Subscribe for DropCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ItemDropped {
//!             // increment a shed-load counter
//!         }
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub(crate) use subscriber_set::panic_message;
pub use subscriber_set::SubscriberSet;
