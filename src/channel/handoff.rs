//! # Hand-off channel.
//!
//! A typed, bounded, multi-producer / multi-consumer conduit. Every item is
//! received by exactly one consumer, in FIFO order per channel.
//!
//! ## Capacity
//! ```text
//! capacity = 0  (rendezvous)
//!   send ──► [offer] ──► receiver takes item ──► send returns Ok
//!   A sender whose future is dropped (or whose deadline fires) withdraws the
//!   offer; the item is never delivered after the sender gave up.
//!
//! capacity = N  (buffered)
//!   send ──► [slot 1 .. slot N] ──► receiver
//!   send blocks only while all N slots are occupied.
//! ```
//!
//! ## Closing
//! - [`Sender::close`] stops new sends: no further items are
//!   accepted, but items already accepted still drain to receivers.
//! - Dropping every [`Sender`] clone closes the channel as well.
//! - [`Receiver::recv`] returns `None` only once the channel is closed **and**
//!   drained.
//!
//! ## Rendezvous `try_send`
//! Receivers waiting in `recv` on a rendezvous channel register a direct
//! hand-off slot. `try_send` fills the oldest live slot or fails with
//! `Full`; it never parks the item in the underlying buffer. A receiver
//! dropped after its slot was filled forwards the item to the next waiting
//! receiver, or drops it when none is left.
//!
//! ## Rules
//! - A send that started before `close` completes normally.
//! - Dropping a pending `recv` never loses a buffered or offered item.
//! - Receivers queue on an async mutex around the underlying `mpsc` receiver;
//!   which receiver gets which item is unspecified.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, mpsc, oneshot};

use crate::channel::error::{SendError, SendTimeoutError, TryRecvError, TrySendError};
use crate::deadline::Deadline;
use crate::error::DeadlineError;

/// Creates a hand-off channel. `capacity = 0` gives a rendezvous channel.
///
/// # Example
/// ```rust
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let (tx, rx) = corral::channel::<&str>(2);
///     tx.send("paper").await.unwrap();
///     tx.close();
///     assert_eq!(rx.recv().await, Some("paper"));
///     assert_eq!(rx.recv().await, None);
/// }
/// ```
pub fn channel<T>(capacity: usize) -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let waiters = (capacity == 0).then(|| Arc::new(Waiters::new()));
    let sender = Sender {
        shared: Arc::new(SenderShared {
            tx: Mutex::new(Some(tx)),
            capacity,
            waiters: waiters.clone(),
        }),
    };
    let receiver = Receiver {
        rx: Arc::new(AsyncMutex::new(rx)),
        waiters,
    };
    (sender, receiver)
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn bounded<F: Future>(
    deadline: Option<&Deadline>,
    fut: F,
) -> Result<F::Output, DeadlineError> {
    match deadline {
        Some(d) => d.run(fut).await,
        None => Ok(fut.await),
    }
}

enum Envelope<T> {
    Item(T),
    Offer(Offer<T>),
}

impl<T> Envelope<T> {
    /// Extracts the item; `None` for an offer its sender already withdrew.
    fn open(self) -> Option<T> {
        match self {
            Envelope::Item(item) => Some(item),
            Envelope::Offer(offer) => offer.take(),
        }
    }
}

/// Rendezvous offer: the item stays in a slot shared with the waiting sender
/// until a receiver takes it or the sender withdraws it.
struct Offer<T> {
    slot: Arc<Mutex<Option<T>>>,
    taken: oneshot::Sender<()>,
}

impl<T> Offer<T> {
    fn new(item: T) -> (Offer<T>, Pending<T>) {
        let slot = Arc::new(Mutex::new(Some(item)));
        let (taken_tx, taken_rx) = oneshot::channel();
        let offer = Offer {
            slot: Arc::clone(&slot),
            taken: taken_tx,
        };
        (
            offer,
            Pending {
                slot,
                taken: taken_rx,
            },
        )
    }

    fn take(self) -> Option<T> {
        let item = lock(&self.slot).take();
        if item.is_some() {
            let _ = self.taken.send(());
        }
        item
    }
}

/// Sender-side half of an offer. Dropping it withdraws the item.
struct Pending<T> {
    slot: Arc<Mutex<Option<T>>>,
    taken: oneshot::Receiver<()>,
}

impl<T> Pending<T> {
    async fn wait(mut self, deadline: Option<&Deadline>) -> Result<(), SendTimeoutError<T>> {
        let res = bounded(deadline, &mut self.taken).await;
        match (res, self.withdraw()) {
            (_, None) => Ok(()),
            (Ok(_), Some(item)) => Err(SendTimeoutError::Closed(item)),
            (Err(cause), Some(item)) => Err(SendTimeoutError::Abandoned { item, cause }),
        }
    }

    fn withdraw(&self) -> Option<T> {
        lock(&self.slot).take()
    }
}

impl<T> Drop for Pending<T> {
    fn drop(&mut self) {
        self.withdraw();
    }
}

/// Receivers currently waiting in `recv` on a rendezvous channel, oldest first.
struct Waiters<T> {
    queue: Mutex<VecDeque<(u64, oneshot::Sender<T>)>>,
    next_id: AtomicU64,
}

impl<T> Waiters<T> {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn register(self: &Arc<Self>) -> Waiter<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        lock(&self.queue).push_back((id, tx));
        Waiter {
            id,
            waiters: Arc::clone(self),
            slot: rx,
            settled: false,
        }
    }

    /// Fills the oldest slot whose receiver is still alive.
    fn hand_off(&self, mut item: T) -> Result<(), T> {
        let mut queue = lock(&self.queue);
        while let Some((_, slot)) = queue.pop_front() {
            match slot.send(item) {
                Ok(()) => return Ok(()),
                Err(back) => item = back,
            }
        }
        Err(item)
    }
}

/// A receiver's registration in [`Waiters`]; dropping it deregisters.
struct Waiter<T> {
    id: u64,
    waiters: Arc<Waiters<T>>,
    slot: oneshot::Receiver<T>,
    settled: bool,
}

impl<T> Waiter<T> {
    /// Resolves once a `try_send` fills this slot.
    async fn handed(&mut self) -> T {
        if !self.settled {
            let res = (&mut self.slot).await;
            self.settled = true;
            if let Ok(item) = res {
                return item;
            }
        }
        std::future::pending().await
    }

    fn take_now(&mut self) -> Option<T> {
        if self.settled {
            return None;
        }
        self.slot.try_recv().ok()
    }
}

impl<T> Drop for Waiter<T> {
    fn drop(&mut self) {
        lock(&self.waiters.queue).retain(|(id, _)| *id != self.id);
        if self.settled {
            return;
        }
        self.slot.close();
        if let Ok(item) = self.slot.try_recv() {
            if self.waiters.hand_off(item).is_err() {
                tracing::debug!("rendezvous receiver dropped; handed item discarded");
            }
        }
    }
}

struct SenderShared<T> {
    tx: Mutex<Option<mpsc::Sender<Envelope<T>>>>,
    capacity: usize,
    waiters: Option<Arc<Waiters<T>>>,
}

/// Sending half. Clone it for multiple producers.
pub struct Sender<T> {
    shared: Arc<SenderShared<T>>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> std::fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sender")
            .field("capacity", &self.shared.capacity)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<T> Sender<T> {
    fn inner(&self) -> Option<mpsc::Sender<Envelope<T>>> {
        lock(&self.shared.tx).clone()
    }

    /// Sends `item`, waiting for a free slot (buffered) or a receiver (rendezvous).
    ///
    /// Fails only if the channel is closed, returning the item.
    pub async fn send(&self, item: T) -> Result<(), SendError<T>> {
        self.send_inner(item, None)
            .await
            .map_err(|e| SendError(e.into_inner()))
    }

    /// Like [`send`](Self::send), but gives up when `deadline` fires.
    ///
    /// On a rendezvous channel the item is delivered only if a receiver took
    /// it before the deadline; otherwise it is handed back.
    pub async fn send_until(&self, item: T, deadline: &Deadline) -> Result<(), SendTimeoutError<T>> {
        self.send_inner(item, Some(deadline)).await
    }

    async fn send_inner(
        &self,
        item: T,
        deadline: Option<&Deadline>,
    ) -> Result<(), SendTimeoutError<T>> {
        let Some(tx) = self.inner() else {
            return Err(SendTimeoutError::Closed(item));
        };
        let permit = match bounded(deadline, tx.reserve()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_closed)) => return Err(SendTimeoutError::Closed(item)),
            Err(cause) => return Err(SendTimeoutError::Abandoned { item, cause }),
        };
        if self.shared.capacity > 0 {
            permit.send(Envelope::Item(item));
            return Ok(());
        }
        let (offer, pending) = Offer::new(item);
        permit.send(Envelope::Offer(offer));
        pending.wait(deadline).await
    }

    /// Attempts to send without waiting.
    ///
    /// On a rendezvous channel this succeeds only when a receiver is waiting
    /// in `recv` at this instant; the item goes straight to that receiver.
    pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
        let Some(tx) = self.inner() else {
            return Err(TrySendError::Closed(item));
        };
        if let Some(waiters) = &self.shared.waiters {
            if tx.is_closed() {
                return Err(TrySendError::Closed(item));
            }
            return waiters.hand_off(item).map_err(TrySendError::Full);
        }
        match tx.try_reserve() {
            Ok(permit) => {
                permit.send(Envelope::Item(item));
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(())) => Err(TrySendError::Full(item)),
            Err(mpsc::error::TrySendError::Closed(())) => Err(TrySendError::Closed(item)),
        }
    }

    /// Closes the channel. Idempotent; buffered items still drain.
    ///
    /// Returns `true` if this call performed the close.
    pub fn close(&self) -> bool {
        lock(&self.shared.tx).take().is_some()
    }

    /// Returns `true` once closed, or once every receiver is gone.
    pub fn is_closed(&self) -> bool {
        match &*lock(&self.shared.tx) {
            Some(tx) => tx.is_closed(),
            None => true,
        }
    }

    /// Configured capacity (`0` = rendezvous).
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

/// Receiving half. Clone it for multiple consumers.
pub struct Receiver<T> {
    rx: Arc<AsyncMutex<mpsc::Receiver<Envelope<T>>>>,
    waiters: Option<Arc<Waiters<T>>>,
}

impl<T> Clone for Receiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: Arc::clone(&self.rx),
            waiters: self.waiters.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let waiting = self
            .waiters
            .as_ref()
            .map_or(0, |w| lock(&w.queue).len());
        f.debug_struct("Receiver")
            .field("rendezvous", &self.waiters.is_some())
            .field("waiting", &waiting)
            .finish()
    }
}

async fn next_item<T>(rx: &mut mpsc::Receiver<Envelope<T>>) -> Option<T> {
    loop {
        if let Some(item) = rx.recv().await?.open() {
            return Some(item);
        }
    }
}

impl<T> Receiver<T> {
    /// Receives the next item.
    ///
    /// Returns `None` once the channel is closed and drained. Cancel safe for
    /// buffered and offered items; see the module docs for `try_send`.
    pub async fn recv(&self) -> Option<T> {
        let Some(waiters) = &self.waiters else {
            let mut rx = self.rx.lock().await;
            return next_item(&mut rx).await;
        };
        let mut waiter = waiters.register();
        let mut rx = tokio::select! {
            biased;
            item = waiter.handed() => return Some(item),
            rx = self.rx.lock() => rx,
        };
        loop {
            let env = tokio::select! {
                biased;
                item = waiter.handed() => return Some(item),
                env = rx.recv() => env,
            };
            match env {
                Some(env) => {
                    if let Some(item) = env.open() {
                        return Some(item);
                    }
                }
                None => return waiter.take_now(),
            }
        }
    }

    /// Like [`recv`](Self::recv), bounded by `deadline` (deadline wins ties).
    pub async fn recv_until(&self, deadline: &Deadline) -> Result<Option<T>, DeadlineError> {
        deadline.run(self.recv()).await
    }

    /// Takes an item if one is ready. Never blocks.
    ///
    /// Reports [`TryRecvError::Empty`] while another receiver is waiting in
    /// `recv`, even when items are buffered.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        let Ok(mut rx) = self.rx.try_lock() else {
            return Err(TryRecvError::Empty);
        };
        loop {
            match rx.try_recv() {
                Ok(env) => {
                    if let Some(item) = env.open() {
                        return Ok(item);
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => return Err(TryRecvError::Empty),
                Err(mpsc::error::TryRecvError::Disconnected) => return Err(TryRecvError::Closed),
            }
        }
    }
}
