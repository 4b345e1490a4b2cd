use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::deadline::Deadline;
use crate::error::{CheckError, RetryError};
use crate::events::{Bus, Emitter, EventKind};
use crate::policies::BackoffPolicy;

/// Retries `check` every `interval` until it succeeds or `deadline` fires.
///
/// # Example
/// ```rust
/// use std::time::Duration;
/// use corral::{CheckError, Deadline, retry};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let (deadline, _cancel) = Deadline::with_timeout(Duration::from_millis(200));
///     let res = retry::run(&deadline, Duration::from_millis(50), |_dl| async {
///         Err::<(), _>(CheckError::fail("ping error"))
///     })
///     .await;
///     assert_eq!(res.unwrap_err().as_label(), "retry_deadline_exceeded");
/// }
/// ```
pub async fn run<T, F, Fut>(deadline: &Deadline, interval: Duration, check: F) -> Result<T, RetryError>
where
    F: FnMut(&Deadline) -> Fut,
    Fut: Future<Output = Result<T, CheckError>>,
{
    Retry::new(BackoffPolicy::fixed(interval))
        .run(deadline, check)
        .await
}

/// Configurable retry loop.
///
/// Owns its random source so jittered delays are reproducible with
/// [`with_seed`](Self::with_seed).
#[derive(Debug)]
pub struct Retry {
    backoff: BackoffPolicy,
    rng: StdRng,
    emitter: Emitter,
}

impl Retry {
    /// A retry loop using `backoff`, seeded from the OS.
    pub fn new(backoff: BackoffPolicy) -> Self {
        Self::with_rng(backoff, StdRng::from_os_rng())
    }

    /// A retry loop whose jitter is drawn from `rng`.
    pub fn with_rng(backoff: BackoffPolicy, rng: StdRng) -> Self {
        Self {
            backoff,
            rng,
            emitter: Emitter::new("retry"),
        }
    }

    /// Reseeds the jitter source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Sets the name used as the event source.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.emitter.set_source(name);
        self
    }

    /// Publishes attempt events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.emitter.set_bus(bus);
        self
    }

    /// Runs the loop. See the [module docs](crate::retry) for the exact rules.
    pub async fn run<T, F, Fut>(&mut self, deadline: &Deadline, mut check: F) -> Result<T, RetryError>
    where
        F: FnMut(&Deadline) -> Fut,
        Fut: Future<Output = Result<T, CheckError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            self.emitter
                .emit(EventKind::AttemptStarting, |ev| ev.with_attempt(attempt));

            let err = match check(deadline).await {
                Ok(value) => {
                    self.emitter
                        .emit(EventKind::RetrySucceeded, |ev| ev.with_attempt(attempt));
                    tracing::debug!(retry = self.emitter.source(), attempt, "check succeeded");
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(self.give_up(RetryError::Fatal {
                    attempts: attempt,
                    error: err,
                }));
            }
            self.emitter.emit(EventKind::AttemptFailed, |ev| {
                ev.with_attempt(attempt).with_reason(err.to_string())
            });

            if let Some(cause) = deadline.cause() {
                return Err(self.give_up(RetryError::from_deadline(cause, attempt, err)));
            }

            let delay = self
                .backoff
                .pause_after(attempt, deadline.remaining(), &mut self.rng);
            self.emitter.emit(EventKind::RetryScheduled, |ev| {
                ev.with_attempt(attempt)
                    .with_delay(delay)
                    .with_reason(err.to_string())
            });
            tracing::trace!(retry = self.emitter.source(), attempt, ?delay, error = %err, "retry scheduled");

            tokio::select! {
                biased;
                cause = deadline.done() => {
                    return Err(self.give_up(RetryError::from_deadline(cause, attempt, err)));
                }
                _ = tokio::time::sleep(delay) => {}
            }
            if let Some(cause) = deadline.cause() {
                return Err(self.give_up(RetryError::from_deadline(cause, attempt, err)));
            }
        }
    }

    fn give_up(&self, err: RetryError) -> RetryError {
        let attempts = err.attempts();
        self.emitter.emit(EventKind::RetryExhausted, |ev| {
            ev.with_attempt(attempts).with_reason(err.to_string())
        });
        tracing::debug!(retry = self.emitter.source(), attempts, error = %err, "retry gave up");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::JitterPolicy;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_check_stops_at_deadline() {
        let deadline_after = Duration::from_millis(1000);
        let interval = Duration::from_millis(300);
        let (deadline, _cancel) = Deadline::with_timeout(deadline_after);
        let started = Instant::now();

        let err = run(&deadline, interval, |_| async {
            Err::<(), _>(CheckError::fail("ping error"))
        })
        .await
        .unwrap_err();

        assert!(started.elapsed() <= deadline_after + interval);
        assert!(matches!(err, RetryError::DeadlineExceeded { .. }));
        assert_eq!(err.last_error(), &CheckError::fail("ping error"));
        assert_eq!(err.attempts(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_third_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let (deadline, _cancel) = Deadline::with_timeout(Duration::from_secs(10));

        let c = Arc::clone(&calls);
        let value = run(&deadline, Duration::from_millis(100), move |_| {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(CheckError::fail(format!("attempt {n}")))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_stops_immediately() {
        let (deadline, _cancel) = Deadline::with_timeout(Duration::from_secs(10));
        let err = run(&deadline, Duration::from_millis(100), |_| async {
            Err::<(), _>(CheckError::fatal("bad credentials"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.as_label(), "retry_fatal");
        assert_eq!(err.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait_reports_cancelled() {
        let (deadline, cancel) = Deadline::with_cancel();
        let task = tokio::spawn({
            let deadline = deadline.clone();
            async move {
                run(&deadline, Duration::from_secs(60), |_| async {
                    Err::<(), _>(CheckError::fail("ping error"))
                })
                .await
            }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, RetryError::Cancelled { attempts: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fired_deadline_still_attempts_once() {
        let (deadline, cancel) = Deadline::with_cancel();
        cancel.cancel();
        let calls = AtomicU32::new(0);
        let err = run(&deadline, Duration::from_millis(10), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(CheckError::fail("down")) }
        })
        .await
        .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, RetryError::Cancelled { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_tied_with_deadline_reports_deadline() {
        let (deadline, _cancel) = Deadline::with_timeout(Duration::from_millis(100));
        let calls = AtomicU32::new(0);
        let err = run(&deadline, Duration::from_millis(100), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(CheckError::fail("down")) }
        })
        .await
        .unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, RetryError::DeadlineExceeded { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_pause_is_cut_to_deadline() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let (deadline, _cancel) = Deadline::with_timeout(Duration::from_millis(1000));
        let _ = Retry::new(BackoffPolicy::fixed(Duration::from_millis(300)))
            .with_bus(bus)
            .run(&deadline, |_| async { Err::<(), _>(CheckError::fail("down")) })
            .await;

        let mut pauses = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::RetryScheduled {
                pauses.extend(ev.delay_ms);
            }
        }
        assert_eq!(pauses, vec![300, 300, 300, 100]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_jitter_is_reproducible() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(100), 2.0, Duration::from_secs(5))
            .with_jitter(JitterPolicy::Full);

        async fn delays(policy: BackoffPolicy) -> Vec<u32> {
            let bus = Bus::new(256);
            let mut rx = bus.subscribe();
            let (deadline, _cancel) = Deadline::with_timeout(Duration::from_secs(3));
            let _ = Retry::new(policy)
                .with_seed(99)
                .with_bus(bus)
                .run(&deadline, |_| async { Err::<(), _>(CheckError::fail("x")) })
                .await;
            let mut out = Vec::new();
            while let Ok(ev) = rx.try_recv() {
                if ev.kind == EventKind::RetryScheduled {
                    out.extend(ev.delay_ms);
                }
            }
            out
        }

        let a = delays(policy).await;
        let b = delays(policy).await;
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }
}
