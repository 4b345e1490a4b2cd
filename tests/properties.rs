//! Cross-module scenarios: pools, gates, deadlines, retry and fan-out used
//! together the way an application would.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use corral::{
    BackpressureGate, CheckError, Deadline, DeadlineError, DropDecision, FanOut, HandlerFn,
    PoolConfig, RetryError, WorkerPool, WorkerState, fanout, retry, spawn_abandonable,
};
use tokio::time::Instant;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pool_handles_each_item_exactly_once_for_every_size() {
    for workers in [1usize, 2, 4, 7] {
        for items in [0usize, 1, 5, 64] {
            let seen = Arc::new(Mutex::new(HashMap::<usize, usize>::new()));
            let sink = Arc::clone(&seen);
            let pool = WorkerPool::new(
                workers,
                HandlerFn::arc(move |item: usize| {
                    let sink = Arc::clone(&sink);
                    async move {
                        *sink.lock().unwrap().entry(item).or_default() += 1;
                    }
                }),
            );
            for i in 0..items {
                pool.submit(i).await.unwrap();
            }
            pool.shutdown().await;

            let seen = seen.lock().unwrap();
            assert_eq!(seen.len(), items, "g={workers} k={items}");
            assert!(seen.values().all(|n| *n == 1), "g={workers} k={items}");
            assert_eq!(pool.states(), vec![WorkerState::Terminated; workers]);
        }
    }
}

#[tokio::test]
async fn pool_of_four_over_five_letters() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(Mutex::new(HashSet::new()));
    let (c, s) = (Arc::clone(&calls), Arc::clone(&seen));
    let pool = WorkerPool::new(
        4,
        HandlerFn::arc(move |item: &'static str| {
            let (c, s) = (Arc::clone(&c), Arc::clone(&s));
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                assert!(s.lock().unwrap().insert(item), "{item} handled twice");
            }
        }),
    );
    for item in ["a", "b", "c", "d", "e"] {
        pool.submit(item).await.unwrap();
    }
    pool.close();
    pool.wait().await;

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_eq!(seen.lock().unwrap().len(), 5);
}

#[tokio::test]
async fn buffered_pool_drains_before_workers_stop() {
    let handled = Arc::new(AtomicUsize::new(0));
    let h = Arc::clone(&handled);
    let pool = WorkerPool::with_config(
        PoolConfig {
            workers: 2,
            capacity: 8,
            ..PoolConfig::default()
        },
        HandlerFn::arc(move |_: u8| {
            let h = Arc::clone(&h);
            async move {
                tokio::task::yield_now().await;
                h.fetch_add(1, Ordering::SeqCst);
            }
        }),
    );
    for i in 0..8 {
        pool.try_submit(i).unwrap();
    }
    pool.shutdown().await;
    assert_eq!(handled.load(Ordering::SeqCst), 8);
}

#[tokio::test]
async fn gate_burst_never_blocks_and_accounts_for_everything() {
    let (gate, rx) = BackpressureGate::new(10);
    let drained = tokio::spawn(async move {
        let mut n = 0u64;
        while rx.recv().await.is_some() {
            n += 1;
        }
        n
    });

    let k = 5_000u64;
    let mut delivered = 0u64;
    for i in 0..k {
        if gate.try_send(i) == DropDecision::Delivered {
            delivered += 1;
        }
    }
    gate.close();

    let stats = gate.stats();
    assert_eq!(stats.delivered + stats.dropped, k);
    assert_eq!(stats.delivered, delivered);
    assert_eq!(drained.await.unwrap(), delivered);
}

#[tokio::test(start_paused = true)]
async fn cancel_is_idempotent_and_releases_every_waiter_once() {
    let (deadline, cancel) = Deadline::with_timeout(Duration::from_secs(60));
    let released = Arc::new(AtomicUsize::new(0));
    let mut waiters = Vec::new();
    for _ in 0..16 {
        let d = deadline.clone();
        let r = Arc::clone(&released);
        waiters.push(tokio::spawn(async move {
            let cause = d.done().await;
            r.fetch_add(1, Ordering::SeqCst);
            cause
        }));
    }
    tokio::task::yield_now().await;

    for _ in 0..100 {
        cancel.cancel();
    }
    for w in waiters {
        assert_eq!(w.await.unwrap(), DeadlineError::Cancelled);
    }
    assert_eq!(released.load(Ordering::SeqCst), 16);
    assert_eq!(deadline.cause(), Some(DeadlineError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn retry_is_bounded_by_deadline_plus_interval() {
    let d = Duration::from_millis(2_500);
    let i = Duration::from_millis(1_000);
    let (deadline, _cancel) = Deadline::with_timeout(d);
    let start = Instant::now();

    let err = retry::run(&deadline, i, |_| async {
        Err::<(), _>(CheckError::fail("ping error"))
    })
    .await
    .unwrap_err();

    assert!(start.elapsed() <= d + i);
    assert!(matches!(err, RetryError::DeadlineExceeded { .. }));
}

#[tokio::test(start_paused = true)]
async fn abandoned_unit_delivers_late_without_blocking() {
    let finished = Arc::new(AtomicUsize::new(0));
    let f = Arc::clone(&finished);
    let (deadline, _cancel) = Deadline::with_timeout(Duration::from_millis(150));

    let slot = spawn_abandonable(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        f.fetch_add(1, Ordering::SeqCst);
        "data"
    });
    let res = slot.wait_until(&deadline).await;
    assert!(matches!(res, Err(DeadlineError::Exceeded { .. })));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn fanout_returns_one_result_per_input_item() {
    let items: Vec<String> = (0..500).map(|i| format!("item-{i}")).collect();
    let results = fanout::run(items.clone(), |s: String| async move { s.len() })
        .await
        .unwrap();

    assert_eq!(results.len(), items.len());
    let origins: HashSet<&str> = results.iter().map(|r| items[r.index].as_str()).collect();
    let inputs: HashSet<&str> = items.iter().map(String::as_str).collect();
    assert_eq!(origins, inputs);
}

#[tokio::test]
async fn fanout_routed_through_a_pool_of_collectors() {
    let totals = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&totals);
    let pool = WorkerPool::new(
        2,
        HandlerFn::arc(move |batch: Vec<u32>| {
            let sink = Arc::clone(&sink);
            async move {
                let results = FanOut::new()
                    .with_max_concurrent(4)
                    .run(batch, |n| async move { n * 2 })
                    .await
                    .unwrap();
                let sum: u32 = results.iter().map(|r| r.value).sum();
                sink.lock().unwrap().push(sum);
            }
        }),
    );
    pool.submit(vec![1, 2, 3]).await.unwrap();
    pool.submit(vec![10, 20]).await.unwrap();
    pool.shutdown().await;

    let mut totals = totals.lock().unwrap().clone();
    totals.sort_unstable();
    assert_eq!(totals, vec![12, 60]);
}
