//! # LogWriter: structured event logger
//!
//! A subscriber that forwards every [`Event`] to [`tracing`], one record per event,
//! with the job name, id and gauges as structured fields. Install any `tracing`
//! subscriber (e.g. `tracing-subscriber`'s `fmt`) to see the output.
//!
//! ## Example output (fmt layer)
//! ```text
//! DEBUG jobpool: job submitted job="scan-3f2a" id=#0
//! DEBUG jobpool: job queued job="scan-3f2a" id=#0 pending=3
//!  INFO jobpool: job starting job="scan-3f2a" id=#0 active=8 pending=2
//!  INFO jobpool: job completed job="scan-3f2a" id=#0 elapsed_ms=412
//!  WARN jobpool: job failed job="scan-91bc" id=#5 elapsed_ms=37 reason="job failed: refused"
//!  INFO jobpool: pool idle
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let job = e.job.as_deref().unwrap_or("-");
        let id = e.job_id.map(|id| id.to_string()).unwrap_or_default();

        match e.kind {
            EventKind::JobSubmitted => {
                tracing::debug!(target: "jobpool", job, id = %id, "job submitted");
            }
            EventKind::JobQueued => {
                tracing::debug!(
                    target: "jobpool",
                    job,
                    id = %id,
                    pending = e.pending,
                    "job queued"
                );
            }
            EventKind::JobStarting => {
                tracing::info!(
                    target: "jobpool",
                    job,
                    id = %id,
                    active = e.active,
                    pending = e.pending,
                    "job starting"
                );
            }
            EventKind::JobCompleted => {
                tracing::info!(
                    target: "jobpool",
                    job,
                    id = %id,
                    elapsed_ms = e.elapsed_ms,
                    "job completed"
                );
            }
            EventKind::JobFailed => {
                tracing::warn!(
                    target: "jobpool",
                    job,
                    id = %id,
                    elapsed_ms = e.elapsed_ms,
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                    "job failed"
                );
            }
            EventKind::PoolIdle => {
                tracing::info!(target: "jobpool", "pool idle");
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(
                    target: "jobpool",
                    subscriber = job,
                    reason = e.reason.as_deref().unwrap_or("unknown"),
                    "subscriber overflow"
                );
            }
            EventKind::SubscriberPanicked => {
                tracing::warn!(
                    target: "jobpool",
                    subscriber = job,
                    info = e.reason.as_deref().unwrap_or("unknown"),
                    "subscriber panicked"
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
