//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(T) -> Fut`, producing a fresh future
//! per item. Shared state, if any, has to be captured explicitly (`Arc<...>`).
//!
//! ## Example
//! ```rust
//! use corral::{HandlerFn, HandlerRef};
//!
//! let h: HandlerRef<&'static str> = HandlerFn::arc(|item: &'static str| async move {
//!     println!("received work {item}");
//! });
//! # let _ = h;
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::handlers::handler::{BoxHandlerFuture, Handler, HandlerRef};

/// Function-backed handler implementation.
#[derive(Debug, Clone)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Wraps `f` and returns it as a shared handle.
    pub fn arc<T>(f: F) -> HandlerRef<T>
    where
        Self: Handler<T>,
    {
        Arc::new(Self::new(f))
    }
}

impl<T, F, Fut> Handler<T> for HandlerFn<F>
where
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn handle(&self, item: T) -> BoxHandlerFuture {
        Box::pin((self.f)(item))
    }
}
