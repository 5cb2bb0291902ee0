//! # Runtime events emitted by the pool.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Admission events**: a job was submitted, queued, or admitted into a slot
//! - **Completion events**: a job finished (successfully or not), the pool went idle
//! - **Subscriber events**: fan-out diagnostics (overflow, panic)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, job name and id,
//! failure reasons, elapsed time, and slot/queue gauges.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use jobpool::{Event, EventKind, JobId};
//!
//! let ev = Event::new(EventKind::JobFailed)
//!     .with_job("scan-app-17")
//!     .with_job_id(JobId(17))
//!     .with_reason("connection refused")
//!     .with_elapsed(Duration::from_millis(250));
//!
//! assert_eq!(ev.kind, EventKind::JobFailed);
//! assert_eq!(ev.job.as_deref(), Some("scan-app-17"));
//! assert_eq!(ev.elapsed_ms, Some(250));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::jobs::JobId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `job`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `job`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Admission events ===
    /// Job accepted by `submit`, before the admission decision.
    ///
    /// Sets:
    /// - `job`, `job_id`
    JobSubmitted,

    /// No free slot: job appended to the pending queue.
    ///
    /// Sets:
    /// - `job`, `job_id`
    /// - `pending`: queue depth after the push
    JobQueued,

    /// Job admitted into a slot and dispatched.
    ///
    /// Sets:
    /// - `job`, `job_id`
    /// - `active`: number of occupied slots after admission
    /// - `pending`: queue depth after admission
    JobStarting,

    // === Completion events ===
    /// Job finished successfully.
    ///
    /// Sets:
    /// - `job`, `job_id`
    /// - `elapsed_ms`: execution time
    JobCompleted,

    /// Job finished with a failure (returned error or panic).
    ///
    /// Sets:
    /// - `job`, `job_id`
    /// - `elapsed_ms`: execution time
    /// - `reason`: failure message
    JobFailed,

    /// A completion left the pool with no active and no pending jobs.
    ///
    /// Results may still be waiting to be drained.
    PoolIdle,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the job (or subscriber), if applicable.
    pub job: Option<Arc<str>>,
    /// Submission id of the job, if applicable.
    pub job_id: Option<JobId>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Job execution time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Occupied slots at the time of the event.
    pub active: Option<usize>,
    /// Pending queue depth at the time of the event.
    pub pending: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            job_id: None,
            reason: None,
            elapsed_ms: None,
            active: None,
            pending: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a job name.
    #[inline]
    pub fn with_job(mut self, job: impl Into<Arc<str>>) -> Self {
        self.job = Some(job.into());
        self
    }

    /// Attaches a job id.
    #[inline]
    pub fn with_job_id(mut self, id: JobId) -> Self {
        self.job_id = Some(id);
        self
    }

    /// Attaches an execution time (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// Attaches slot/queue gauges.
    #[inline]
    pub fn with_load(mut self, active: usize, pending: usize) -> Self {
        self.active = Some(active);
        self.pending = Some(pending);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_job(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_job(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::JobSubmitted);
        let b = Event::new(EventKind::JobSubmitted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_elapsed_saturates() {
        let ev = Event::new(EventKind::JobCompleted).with_elapsed(Duration::from_secs(u64::MAX));
        assert_eq!(ev.elapsed_ms, Some(u32::MAX));
    }

    #[test]
    fn test_subscriber_overflow_carries_name() {
        let ev = Event::subscriber_overflow("metrics", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.job.as_deref(), Some("metrics"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=metrics reason=full"));
    }
}
