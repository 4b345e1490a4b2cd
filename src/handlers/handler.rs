//! # Item handler abstraction.
//!
//! A [`Handler`] processes one work item at a time. The pool owns the
//! handler behind an `Arc` and calls it concurrently from every worker, so
//! implementations must be `Send + Sync`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by [`Handler::handle`].
pub type BoxHandlerFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Shared handle to a handler.
pub type HandlerRef<T> = Arc<dyn Handler<T>>;

/// # Asynchronous per-item handler.
///
/// Ownership of `item` moves into the handler; exactly one worker ever
/// receives a given item. The handler must not assume any particular
/// ordering across workers.
///
/// # Example
/// ```
/// use corral::{BoxHandlerFuture, Handler};
///
/// struct Printer;
///
/// impl Handler<String> for Printer {
///     fn handle(&self, item: String) -> BoxHandlerFuture {
///         Box::pin(async move { println!("received work {item}") })
///     }
/// }
/// ```
pub trait Handler<T>: Send + Sync + 'static {
    /// Processes one item.
    fn handle(&self, item: T) -> BoxHandlerFuture;
}
