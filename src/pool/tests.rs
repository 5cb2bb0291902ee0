use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Semaphore, broadcast};

use crate::{
    config::PoolConfig,
    error::{JobError, PoolError},
    events::{Event, EventKind},
    jobs::{JobFn, JobId, JobRef},
    subscribers::{ActivityCounts, ActivityTracker, Subscribe},
};

use super::Pool;

/// Running/peak gauges shared by the jobs of one test.
#[derive(Default)]
struct Gauge {
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

fn sleeper(ms: u64) -> JobRef<u64> {
    JobFn::boxed(format!("sleep-{ms}"), move || async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok::<_, JobError>(ms)
    })
}

fn drain_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

fn starting_ids(events: &[Event]) -> Vec<JobId> {
    events
        .iter()
        .filter(|e| e.kind == EventKind::JobStarting)
        .filter_map(|e| e.job_id)
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_never_exceeds_capacity() {
    let mut pool = Pool::<usize>::new(3).unwrap();
    let gauge = Arc::new(Gauge::default());

    for i in 0..20 {
        let gauge = Arc::clone(&gauge);
        pool.submit_fn(format!("job-{i}"), move || async move {
            gauge.enter();
            tokio::time::sleep(Duration::from_millis(20)).await;
            gauge.leave();
            Ok::<_, JobError>(i)
        });
        assert!(pool.active() <= 3);
    }

    let report = pool.drain().await.unwrap();
    assert_eq!(report.success_count(), 20);
    assert_eq!(gauge.peak.load(Ordering::SeqCst), 3);
    assert_eq!(gauge.running.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_job_delivered_once() {
    let mut pool = Pool::<u64>::new(4).unwrap();
    let ids = pool.submit_all((0..50).map(|i| sleeper(i % 7)));
    assert_eq!(ids.len(), 50);

    let mut seen = HashSet::new();
    while pool.has_more_work() {
        let outcome = pool.next().await.unwrap();
        assert!(seen.insert(outcome.id), "duplicate outcome for {}", outcome.id);
    }

    assert_eq!(seen, ids.into_iter().collect::<HashSet<_>>());
    assert!(matches!(pool.next().await, Err(PoolError::EmptyPool)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_slots_five_jobs() {
    let mut pool = Pool::<u64>::new(2).unwrap();
    let mut rx = pool.subscribe();

    pool.submit_all([100, 100, 10, 10, 10].map(sleeper));
    let stats = pool.stats();
    assert_eq!((stats.active, stats.pending, stats.submitted), (2, 3, 5));

    let mut order = Vec::new();
    while pool.has_more_work() {
        order.push(pool.next().await.unwrap().id);
    }
    assert_eq!(order.len(), 5);

    let slow: HashSet<_> = [JobId(0), JobId(1)].into();
    assert!(slow.contains(&order[0]) && slow.contains(&order[1]));

    let events = drain_events(&mut rx);
    assert_eq!(
        starting_ids(&events),
        (0..5).map(JobId).collect::<Vec<_>>()
    );
    for ev in events.iter().filter(|e| e.kind == EventKind::JobStarting) {
        assert!(ev.active.is_some_and(|a| a <= 2));
    }
}

#[tokio::test]
async fn test_outcomes_in_completion_order() {
    let mut pool = Pool::<u64>::new(2).unwrap();
    pool.submit(sleeper(200));
    pool.submit(sleeper(10));

    let first = pool.next().await.unwrap();
    assert_eq!(first.id, JobId(1));
    assert_eq!(first.value(), Some(&10));

    let second = pool.next().await.unwrap();
    assert_eq!(second.id, JobId(0));
    assert!(!pool.has_more_work());
}

#[tokio::test]
async fn test_single_slot_runs_in_submission_order() {
    let mut pool = Pool::<u64>::new(1).unwrap();
    pool.submit_all([30, 5, 20, 1, 10].map(sleeper));

    let report = pool.drain().await.unwrap();
    let ids: Vec<_> = report.succeeded.iter().map(|o| o.id).collect();
    assert_eq!(ids, (0..5).map(JobId).collect::<Vec<_>>());
    assert_eq!(report.into_values(), vec![30, 5, 20, 1, 10]);
}

#[tokio::test]
async fn test_empty_pool() {
    let mut pool = Pool::<()>::new(4).unwrap();

    assert!(!pool.has_more_work());
    assert!(pool.stats().is_idle());
    assert_eq!(pool.next().await.unwrap_err(), PoolError::EmptyPool);
    assert!(pool.try_next().is_none());

    let report = pool.drain().await.unwrap();
    assert_eq!(report.total(), 0);
}

#[tokio::test]
async fn test_zero_capacity_rejected() {
    let err = Pool::<()>::new(0).unwrap_err();
    assert_eq!(err, PoolError::InvalidConfiguration { capacity: 0 });
}

#[tokio::test]
async fn test_idle_after_drain() {
    let mut pool = Pool::<u64>::new(2).unwrap();
    pool.submit_all([5, 5, 5].map(sleeper));
    pool.drain().await.unwrap();

    let stats = pool.stats();
    assert!(stats.is_idle());
    assert_eq!(stats.submitted, 3);
    assert!(!pool.has_more_work());
    assert_eq!(pool.next().await.unwrap_err(), PoolError::EmptyPool);
}

#[tokio::test]
async fn test_failures_are_outcomes() {
    let mut pool = Pool::<&'static str>::new(2).unwrap();

    pool.submit_fn("ok", || async { Ok::<_, JobError>("fine") });
    pool.submit_fn("fail", || async { Err::<&str, _>(JobError::fail("refused")) });
    pool.submit_fn("panic", || async {
        if true {
            panic!("scanner crashed");
        }
        Ok::<_, JobError>("unreachable")
    });

    let report = pool.drain().await.unwrap();
    assert_eq!(report.success_count(), 1);
    assert_eq!(report.failure_count(), 2);

    let panicked: Vec<_> = report
        .failed
        .iter()
        .filter_map(|o| o.error())
        .filter(|e| e.is_panic())
        .collect();
    assert_eq!(panicked.len(), 1);
    assert_eq!(panicked[0].as_message(), "panic: scanner crashed");

    // Slots were released: the pool keeps working.
    assert_eq!(pool.active(), 0);
    pool.submit(JobFn::new("again", || async { Ok::<_, JobError>("again") }));
    assert_eq!(pool.next().await.unwrap().into_result(), Ok("again"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_handle_submits_from_other_task() {
    let mut pool = Pool::<u64>::new(3).unwrap();
    let handle = pool.handle();

    let producer = tokio::spawn(async move {
        for i in 0..10 {
            handle.submit(sleeper(i));
        }
        handle.stats().submitted
    });
    for i in 0..10 {
        pool.submit(sleeper(i));
    }
    producer.await.unwrap();

    let report = pool.drain().await.unwrap();
    assert_eq!(report.total(), 20);
    assert_eq!(pool.stats().submitted, 20);
}

#[tokio::test]
async fn test_queue_is_fifo_and_stats_track_it() {
    let mut pool = Pool::<usize>::new(1).unwrap();
    let mut rx = pool.subscribe();
    let gate = Arc::new(Semaphore::new(0));

    for i in 0..3 {
        let gate = Arc::clone(&gate);
        pool.submit_fn(format!("gated-{i}"), move || async move {
            gate.acquire().await.map_err(JobError::fail)?.forget();
            Ok::<_, JobError>(i)
        });
    }

    let stats = pool.stats();
    assert_eq!((stats.active, stats.pending, stats.undrained), (1, 2, 0));
    assert!(pool.is_full());
    assert!(pool.has_more_work());

    gate.add_permits(3);
    let report = pool.drain().await.unwrap();
    assert_eq!(report.into_values(), vec![0, 1, 2]);
    assert_eq!(
        starting_ids(&drain_events(&mut rx)),
        vec![JobId(0), JobId(1), JobId(2)]
    );
}

#[tokio::test]
async fn test_admission_events_are_ordered() {
    let mut pool = Pool::<u64>::new(1).unwrap();
    let mut rx = pool.subscribe();

    pool.submit(sleeper(1));
    pool.submit(sleeper(1));

    let kinds: Vec<_> = drain_events(&mut rx)
        .into_iter()
        .map(|e| (e.kind, e.job_id))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (EventKind::JobSubmitted, Some(JobId(0))),
            (EventKind::JobStarting, Some(JobId(0))),
            (EventKind::JobSubmitted, Some(JobId(1))),
            (EventKind::JobQueued, Some(JobId(1))),
        ]
    );

    pool.drain().await.unwrap();
    let tail: Vec<_> = drain_events(&mut rx).into_iter().map(|e| e.kind).collect();
    assert_eq!(tail.last(), Some(&EventKind::PoolIdle));
    assert_eq!(
        tail.iter().filter(|k| **k == EventKind::JobCompleted).count(),
        2
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_tracker_sees_bounded_activity() {
    let tracker = Arc::new(ActivityTracker::new());
    let mut pool = Pool::<u32>::builder(PoolConfig::with_capacity(3))
        .with_subscribers(vec![tracker.clone() as Arc<dyn Subscribe>])
        .build()
        .unwrap();

    for i in 0..15u32 {
        pool.submit_fn(format!("job-{i}"), move || async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if i % 5 == 0 {
                return Err(JobError::fail(format!("job {i} refused")));
            }
            Ok(i)
        });
    }

    let report = pool.drain().await.unwrap();
    assert_eq!((report.success_count(), report.failure_count()), (12, 3));
    pool.finish().await;

    let peak = tracker.peak().await;
    assert!((1..=3).contains(&peak), "peak {peak} out of range");
    assert!(tracker.snapshot().await.is_empty());
    assert_eq!(
        tracker.counts().await,
        ActivityCounts {
            completed: 12,
            failed: 3
        }
    );
}

#[tokio::test]
async fn test_drain_with_reports_progress() {
    let mut pool = Pool::<u64>::new(4).unwrap();
    pool.submit_all((0..12).map(|_| sleeper(1)));

    let mut indices = Vec::new();
    let report = pool
        .drain_with(|i, outcome| {
            assert!(outcome.is_ok());
            indices.push(i);
        })
        .await
        .unwrap();

    assert_eq!(indices, (0..12).collect::<Vec<_>>());
    assert_eq!(report.total(), 12);
}

#[test]
fn test_runtime_shutdown_fails_jobs_instead_of_hanging() {
    let jobs_rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()
        .unwrap();
    let mut pool = Pool::<u64>::builder(PoolConfig::with_capacity(1))
        .with_runtime(jobs_rt.handle().clone())
        .build()
        .unwrap();

    pool.submit(sleeper(5_000));
    pool.submit(sleeper(5_000));
    assert_eq!((pool.active(), pool.pending()), (1, 1));

    // Drops the running unit; the queued job can never start.
    jobs_rt.shutdown_background();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let report = rt
        .block_on(async { tokio::time::timeout(Duration::from_secs(5), pool.drain()).await })
        .expect("drain must not hang after runtime shutdown")
        .unwrap();

    assert_eq!(report.failure_count(), 2);
    assert!(
        report
            .failed
            .iter()
            .all(|o| o.error().is_some_and(JobError::is_abandoned))
    );
    assert!(pool.stats().is_idle());
    assert!(!pool.has_more_work());
}
