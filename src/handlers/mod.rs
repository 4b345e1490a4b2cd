//! # Handler abstractions for worker pools.
//!
//! - [`Handler`] trait implemented by anything that processes items
//! - [`HandlerFn`] closure-backed implementation
//! - [`HandlerRef`] shared reference (`Arc<dyn Handler<T>>`)

mod handler;
mod handler_fn;

pub use handler::{BoxHandlerFuture, Handler, HandlerRef};
pub use handler_fn::HandlerFn;
