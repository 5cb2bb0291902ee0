use std::collections::VecDeque;
use std::sync::Arc;

use crate::jobs::{JobId, JobRef};

/// A job that has entered the pool but not started yet.
pub(super) struct QueuedJob<T> {
    pub id: JobId,
    pub name: Arc<str>,
    pub job: JobRef<T>,
}

/// Admission bookkeeping, guarded by the pool's single mutex.
///
/// Every job is counted in exactly one place: `pending`, `active`, `undrained`
/// (finished, outcome buffered) or nowhere (drained by the consumer).
pub(super) struct State<T> {
    /// Jobs currently executing (`0..=capacity`).
    pub active: usize,

    /// Jobs waiting for a free slot (FIFO).
    pub pending: VecDeque<QueuedJob<T>>,

    /// Finished jobs whose outcome has not been taken by `next()` yet.
    pub undrained: usize,

    /// Id handed to the next submission.
    pub next_id: u64,
}

impl<T> State<T> {
    pub fn new() -> Self {
        Self {
            active: 0,
            pending: VecDeque::new(),
            undrained: 0,
            next_id: 0,
        }
    }

    /// True while any job is running, waiting, or waiting to be drained.
    pub fn has_more_work(&self) -> bool {
        self.active > 0 || !self.pending.is_empty() || self.undrained > 0
    }

    pub fn stats(&self, capacity: usize) -> PoolStats {
        PoolStats {
            capacity,
            active: self.active,
            pending: self.pending.len(),
            undrained: self.undrained,
            submitted: self.next_id,
        }
    }
}

/// Point-in-time view of the pool, taken under the admission lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of slots.
    pub capacity: usize,
    /// Jobs currently executing.
    pub active: usize,
    /// Jobs waiting for a slot.
    pub pending: usize,
    /// Finished jobs not yet drained.
    pub undrained: usize,
    /// Jobs submitted over the pool's lifetime.
    pub submitted: u64,
}

impl PoolStats {
    /// True when every slot is occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.active >= self.capacity
    }

    /// True when nothing is running, waiting, or left to drain.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.active == 0 && self.pending == 0 && self.undrained == 0
    }
}
