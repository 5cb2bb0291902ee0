//! # Job activity tracker with sequence-based ordering.
//!
//! Maintains a view of which jobs are currently running, the highest number of
//! jobs it ever saw running at once, and completion counters.
//!
//! ## Architecture
//! ```text
//! Pool ──► Bus ──► listener ──► SubscriberSet ──► ActivityTracker::update()
//!                                                         │
//!                                                         ▼
//!                                           HashMap<JobId, JobState>
//!                                               (id → {seq, running})
//! ```
//!
//! ## Rules
//! - Only `JobStarting` / `JobCompleted` / `JobFailed` change running state
//! - Read operations (`snapshot`, `is_running`, `peak`) are **eventually consistent**
//! - Events with `seq <= last_seq` for the same job are **rejected** (stale)
//! - A job's entry is removed once it completes or fails; the map only holds live jobs

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::events::{Event, EventKind};
use crate::jobs::JobId;
use crate::subscribers::Subscribe;

/// Per-job state for ordering validation.
#[derive(Debug, Clone)]
struct JobState {
    last_seq: Option<u64>,
    running: bool,
}

#[derive(Debug, Default)]
struct Activity {
    jobs: HashMap<JobId, JobState>,
    running: usize,
    peak: usize,
    completed: u64,
    failed: u64,
}

/// Completion counters observed by an [`ActivityTracker`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ActivityCounts {
    /// Jobs that finished successfully.
    pub completed: u64,
    /// Jobs that failed or panicked.
    pub failed: u64,
}

/// Thread-safe tracker of running jobs.
///
/// Useful for dashboards and for checking the concurrency cap from the outside:
/// [`peak`](ActivityTracker::peak) never exceeds the pool capacity.
#[derive(Default)]
pub struct ActivityTracker {
    state: RwLock<Activity>,
}

impl ActivityTracker {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an event if it is newer than the last one seen for the same job.
    ///
    /// Returns `true` if the running state changed.
    pub async fn update(&self, ev: &Event) -> bool {
        let Some(id) = ev.job_id else {
            return false;
        };

        let mut state = self.state.write().await;
        let Activity {
            jobs,
            running,
            peak,
            completed,
            failed,
        } = &mut *state;

        let entry = jobs.entry(id).or_insert(JobState {
            last_seq: None,
            running: false,
        });
        if entry.last_seq.is_some_and(|last| ev.seq <= last) {
            return false;
        }
        entry.last_seq = Some(ev.seq);

        match ev.kind {
            EventKind::JobStarting if !entry.running => {
                entry.running = true;
                *running += 1;
                *peak = (*peak).max(*running);
                true
            }
            EventKind::JobCompleted | EventKind::JobFailed => {
                if ev.kind == EventKind::JobCompleted {
                    *completed += 1;
                } else {
                    *failed += 1;
                }
                let was_running = entry.running;
                jobs.remove(&id);
                if was_running {
                    *running -= 1;
                }
                was_running
            }
            _ => false,
        }
    }

    /// Returns sorted ids of jobs currently running.
    pub async fn snapshot(&self) -> Vec<JobId> {
        let state = self.state.read().await;
        let mut running: Vec<JobId> = state
            .jobs
            .iter()
            .filter(|(_, js)| js.running)
            .map(|(id, _)| *id)
            .collect();
        running.sort_unstable();
        running
    }

    /// Returns true if the job is currently running.
    pub async fn is_running(&self, id: JobId) -> bool {
        self.state
            .read()
            .await
            .jobs
            .get(&id)
            .map(|js| js.running)
            .unwrap_or(false)
    }

    /// Highest number of simultaneously running jobs observed.
    pub async fn peak(&self) -> usize {
        self.state.read().await.peak
    }

    /// Completed/failed counters.
    pub async fn counts(&self) -> ActivityCounts {
        let state = self.state.read().await;
        ActivityCounts {
            completed: state.completed,
            failed: state.failed,
        }
    }
}

#[async_trait]
impl Subscribe for ActivityTracker {
    async fn on_event(&self, event: &Event) {
        self.update(event).await;
    }

    fn name(&self) -> &'static str {
        "ActivityTracker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(kind: EventKind, id: u64) -> Event {
        Event::new(kind).with_job_id(JobId(id))
    }

    #[tokio::test]
    async fn test_tracks_running_and_peak() {
        let tracker = ActivityTracker::new();

        assert!(tracker.update(&ev(EventKind::JobStarting, 0)).await);
        assert!(tracker.update(&ev(EventKind::JobStarting, 1)).await);
        assert_eq!(tracker.snapshot().await, vec![JobId(0), JobId(1)]);

        assert!(tracker.update(&ev(EventKind::JobCompleted, 0)).await);
        assert!(tracker.update(&ev(EventKind::JobStarting, 2)).await);
        assert!(tracker.update(&ev(EventKind::JobFailed, 1)).await);

        assert!(tracker.is_running(JobId(2)).await);
        assert!(!tracker.is_running(JobId(0)).await);
        assert_eq!(tracker.peak().await, 2);
        assert_eq!(
            tracker.counts().await,
            ActivityCounts {
                completed: 1,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn test_stale_event_rejected() {
        let tracker = ActivityTracker::new();
        let first = ev(EventKind::JobStarting, 9);
        let second = ev(EventKind::JobStarting, 9);

        // Newer event applied first; the older one for the same job is dropped.
        assert!(tracker.update(&second).await);
        assert!(!tracker.update(&first).await);
        assert_eq!(tracker.snapshot().await, vec![JobId(9)]);
        assert_eq!(tracker.peak().await, 1);
    }

    #[tokio::test]
    async fn test_finished_jobs_are_pruned() {
        let tracker = ActivityTracker::new();
        for id in 0..50 {
            tracker.update(&ev(EventKind::JobSubmitted, id)).await;
            tracker.update(&ev(EventKind::JobStarting, id)).await;
            let last = if id % 10 == 0 {
                EventKind::JobFailed
            } else {
                EventKind::JobCompleted
            };
            assert!(tracker.update(&ev(last, id)).await);
        }

        assert!(tracker.state.read().await.jobs.is_empty());
        assert!(tracker.snapshot().await.is_empty());
        assert_eq!(
            tracker.counts().await,
            ActivityCounts {
                completed: 45,
                failed: 5
            }
        );
    }

    #[tokio::test]
    async fn test_events_without_job_ignored() {
        let tracker = ActivityTracker::new();
        assert!(!tracker.update(&Event::new(EventKind::PoolIdle)).await);
        assert!(tracker.snapshot().await.is_empty());
    }
}
