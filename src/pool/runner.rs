//! # Run a single job inside its execution unit.
//!
//! Starts one [`Job`](crate::Job), captures panics, measures execution time and
//! publishes the terminal event to the [`Bus`].
//!
//! ## Event flow
//!
//! ```text
//! Success:
//!   job.start() → Ok(value)  → publish JobCompleted
//!
//! Failure:
//!   job.start() → Err(Fail)  → publish JobFailed
//!
//! Panic:
//!   job.start() → panic      → catch_unwind → Err(Panicked) → publish JobFailed
//! ```
//!
//! ## Rules
//! - Publishes **exactly one** terminal event, `JobCompleted` or `JobFailed`, when the bus
//!   has receivers
//! - Always returns an [`Outcome`]; a unit dropped before that is handled by the pool's
//!   unit guard (reported as `JobError::Abandoned`)

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;

use crate::{
    error::JobError,
    events::{Bus, Event, EventKind},
    jobs::Outcome,
};

use super::state::QueuedJob;

/// Executes `queued` to completion and turns whatever happened into an [`Outcome`].
pub(super) async fn run_job<T: Send + 'static>(queued: QueuedJob<T>, bus: &Bus) -> Outcome<T> {
    let QueuedJob { id, name, job } = queued;
    let started = Instant::now();

    // `start()` runs inside the guarded future so a panicking constructor is caught too.
    let result = match AssertUnwindSafe(async move { job.start().await })
        .catch_unwind()
        .await
    {
        Ok(res) => res,
        Err(payload) => Err(JobError::Panicked {
            info: panic_message(payload.as_ref()),
        }),
    };
    let elapsed = started.elapsed();

    if bus.has_receivers() {
        let ev = match &result {
            Ok(_) => Event::new(EventKind::JobCompleted),
            Err(e) => Event::new(EventKind::JobFailed).with_reason(e.to_string()),
        };
        bus.publish(
            ev.with_job(name.clone())
                .with_job_id(id)
                .with_elapsed(elapsed),
        );
    }

    Outcome {
        id,
        name,
        result,
        elapsed,
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::jobs::{JobFn, JobId};

    fn queued<T: Send + 'static>(job: crate::JobRef<T>) -> QueuedJob<T> {
        QueuedJob {
            id: JobId(1),
            name: Arc::from(job.name()),
            job,
        }
    }

    #[tokio::test]
    async fn test_success_publishes_completed() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let job = JobFn::boxed("ok", || async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, JobError>(1u8)
        });
        let outcome = run_job(queued(job), &bus).await;

        assert_eq!(outcome.result, Ok(1));
        assert!(outcome.elapsed >= Duration::from_millis(5));
        let ev = rx.recv().await.expect("terminal event");
        assert_eq!(ev.kind, EventKind::JobCompleted);
        assert_eq!(ev.job_id, Some(JobId(1)));
    }

    #[tokio::test]
    async fn test_failure_publishes_failed_with_reason() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        let job = JobFn::boxed("bad", || async { Err::<u8, _>(JobError::fail("refused")) });
        let outcome = run_job(queued(job), &bus).await;

        assert_eq!(outcome.result, Err(JobError::fail("refused")));
        let ev = rx.recv().await.expect("terminal event");
        assert_eq!(ev.kind, EventKind::JobFailed);
        assert_eq!(ev.reason.as_deref(), Some("job failed: refused"));
    }

    #[tokio::test]
    async fn test_runs_without_receivers() {
        let bus = Bus::new(8);
        assert!(!bus.has_receivers());

        let job = JobFn::boxed("quiet", || async { Ok::<_, JobError>(3u8) });
        let outcome = run_job(queued(job), &bus).await;
        assert_eq!(outcome.result, Ok(3));
    }

    #[tokio::test]
    async fn test_panic_is_captured() {
        let bus = Bus::new(8);

        let job = JobFn::boxed("explodes", || async {
            if true {
                panic!("kaboom");
            }
            Ok::<_, JobError>(0u8)
        });
        let outcome = run_job(queued(job), &bus).await;

        assert_eq!(
            outcome.result,
            Err(JobError::Panicked {
                info: "kaboom".into()
            })
        );
    }

    #[tokio::test]
    async fn test_panic_in_closure_body_is_captured() {
        let bus = Bus::new(8);

        type Eager = futures::future::Ready<Result<u8, JobError>>;
        let job: crate::JobRef<u8> = JobFn::boxed("eager", || -> Eager {
            panic!("{}", String::from("before future"))
        });
        let outcome = run_job(queued(job), &bus).await;

        assert!(matches!(
            outcome.result,
            Err(JobError::Panicked { ref info }) if info == "before future"
        ));
    }
}
