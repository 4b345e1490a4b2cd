use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::channel;
use crate::error::FanOutError;
use crate::events::{Bus, Emitter, EventKind};

/// One unit's output, tagged with the position of its input item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FanOutResult<R> {
    /// Index of the originating item in the input sequence.
    pub index: usize,
    /// Value computed by the unit.
    pub value: R,
}

/// Runs `work` on every item concurrently and collects all results.
///
/// Equivalent to `FanOut::new().run(items, work)`.
pub async fn run<I, F, Fut>(items: I, work: F) -> Result<Vec<FanOutResult<Fut::Output>>, FanOutError>
where
    I: IntoIterator,
    I::Item: Send + 'static,
    F: Fn(I::Item) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    FanOut::new().run(items, work).await
}

/// Configurable fan-out collector.
#[derive(Clone, Debug)]
pub struct FanOut {
    max_concurrent: usize,
    emitter: Emitter,
}

impl Default for FanOut {
    fn default() -> Self {
        Self::new()
    }
}

impl FanOut {
    /// An unbounded collector.
    pub fn new() -> Self {
        Self {
            max_concurrent: 0,
            emitter: Emitter::new("fanout"),
        }
    }

    /// Caps how many units compute at once (`0` = unbounded).
    ///
    /// All units are still spawned up front; the surplus waits for a permit.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Sets the name used as the event source.
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.emitter.set_source(name);
        self
    }

    /// Publishes a `FanOutCompleted` event when collection ends.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.emitter.set_bus(bus);
        self
    }

    /// Spawns one unit per item and waits for all of their results.
    pub async fn run<I, F, Fut>(
        &self,
        items: I,
        work: F,
    ) -> Result<Vec<FanOutResult<Fut::Output>>, FanOutError>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        let items: Vec<I::Item> = items.into_iter().collect();
        let expected = items.len();
        if expected == 0 {
            self.completed(0, 0);
            return Ok(Vec::new());
        }

        let (tx, rx) = channel::channel(expected);
        let work = Arc::new(work);
        let permits = match self.max_concurrent {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        };

        for (index, item) in items.into_iter().enumerate() {
            let tx = tx.clone();
            let work = Arc::clone(&work);
            let permits = permits.clone();
            tokio::spawn(async move {
                let _permit = match permits {
                    Some(sem) => match sem.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_closed) => return,
                    },
                    None => None,
                };
                let value = work(item).await;
                if tx.send(FanOutResult { index, value }).await.is_err() {
                    tracing::trace!(index, "fan-out collector gone; late result discarded");
                }
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(expected);
        let mut remaining = expected;
        while remaining > 0 {
            match rx.recv().await {
                Some(result) => {
                    results.push(result);
                    remaining -= 1;
                }
                None => break,
            }
        }

        let received = results.len();
        self.completed(expected, received);
        if received < expected {
            tracing::warn!(fanout = self.emitter.source(), expected, received, "fan-out lost results");
            return Err(FanOutError::Lost { expected, received });
        }
        Ok(results)
    }

    fn completed(&self, expected: usize, received: usize) {
        self.emitter.emit(EventKind::FanOutCompleted, |ev| {
            let ev = ev.with_count(received as u64);
            if received < expected {
                ev.with_reason(format!("lost {} of {expected}", expected - received))
            } else {
                ev
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_units_outliving_collector_finish_quietly() {
        let finished = Arc::new(AtomicUsize::new(0));
        let f = Arc::clone(&finished);
        let collect = run(0..3u32, move |n| {
            let f = Arc::clone(&f);
            async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                f.fetch_add(1, Ordering::SeqCst);
                n
            }
        });
        let res = tokio::time::timeout(Duration::from_millis(10), collect).await;
        assert!(res.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_one_result_per_item() {
        let items: Vec<u32> = (0..64).collect();
        let results = run(items.clone(), |n| async move {
            tokio::time::sleep(Duration::from_millis(u64::from(n % 7))).await;
            n * 10
        })
        .await
        .unwrap();

        assert_eq!(results.len(), items.len());
        let indices: HashSet<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(indices, (0..64).collect());
        for r in &results {
            assert_eq!(r.value, items[r.index] * 10);
        }
    }

    #[tokio::test]
    async fn test_empty_input() {
        let results = run(Vec::<u8>::new(), |n| async move { n }).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_unit_is_reported_lost() {
        let err = run(vec![1, 2, 3], |n: i32| async move {
            if n == 2 {
                panic!("unit crashed");
            }
            n
        })
        .await
        .unwrap_err();
        assert_eq!(
            err,
            FanOutError::Lost {
                expected: 3,
                received: 2
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_width_cap_limits_concurrency() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (r, p) = (Arc::clone(&running), Arc::clone(&peak));

        let results = FanOut::new()
            .with_max_concurrent(3)
            .run(0..12, move |_| {
                let (running, peak) = (Arc::clone(&r), Arc::clone(&p));
                async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .await
            .unwrap();

        assert_eq!(results.len(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_completion_event_published() {
        let bus = Bus::new(8);
        let mut events = bus.subscribe();
        FanOut::new()
            .with_name("lookup")
            .with_bus(bus)
            .run(vec!["a", "b"], |s| async move { s.len() })
            .await
            .unwrap();

        let ev = events.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::FanOutCompleted);
        assert_eq!(ev.count, Some(2));
        assert!(ev.reason.is_none());
    }
}
