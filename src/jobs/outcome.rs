//! # Job identity and tagged outcomes.
//!
//! Every submitted job receives a [`JobId`] (monotonic per pool, in admission-lock order)
//! and produces exactly one [`Outcome`], delivered through [`Pool::next`](crate::Pool::next).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::JobError;

/// Submission id of a job, unique within one pool.
///
/// Ids are assigned under the admission lock, so their order is the order in which
/// jobs entered the pool (and therefore the FIFO order of the pending queue).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tagged result of a finished job.
///
/// A failed job is still an outcome: the pool never drops or retries it.
#[derive(Debug)]
pub struct Outcome<T> {
    /// Submission id.
    pub id: JobId,
    /// Job name as reported by [`Job::name`](crate::Job::name).
    pub name: Arc<str>,
    /// Success value or failure detail.
    pub result: Result<T, JobError>,
    /// Time spent executing (admission to completion).
    pub elapsed: Duration,
}

impl<T> Outcome<T> {
    /// True if the job succeeded.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// True if the job failed or panicked.
    #[inline]
    pub fn is_err(&self) -> bool {
        self.result.is_err()
    }

    /// Borrows the success value, if any.
    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    /// Borrows the failure, if any.
    pub fn error(&self) -> Option<&JobError> {
        self.result.as_ref().err()
    }

    /// Drops the metadata and returns the job's result.
    pub fn into_result(self) -> Result<T, JobError> {
        self.result
    }
}
