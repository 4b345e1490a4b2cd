//! Hand-off channel: the single signaling primitive shared by every other module.
//!
//! ## Contents
//! - [`channel`] constructor (`0` = rendezvous, `N` = buffered)
//! - [`Sender`], [`Receiver`] cloneable halves
//! - [`SendError`], [`TrySendError`], [`SendTimeoutError`], [`TryRecvError`]

mod error;
mod handoff;

pub use error::{SendError, SendTimeoutError, TryRecvError, TrySendError};
pub use handoff::{Receiver, Sender, channel};
