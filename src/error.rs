//! Error types used by the pool and by jobs.
//!
//! This module defines two main error enums:
//!
//! - [`PoolError`] - errors raised by the pool itself (misconfiguration, protocol misuse).
//! - [`JobError`] - failures of individual jobs, delivered as part of an [`Outcome`](crate::Outcome).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::fmt::Display;

use thiserror::Error;

/// # Errors produced by the pool.
///
/// A job's own failure is **never** a `PoolError`; it travels inside the job's
/// [`Outcome`](crate::Outcome). Pool-level errors are limited to construction-time
/// misconfiguration and the [`PoolError::EmptyPool`] guard on [`Pool::next`](crate::Pool::next).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// Capacity must be a positive number of slots.
    #[error("invalid configuration: capacity must be > 0 (got {capacity})")]
    InvalidConfiguration {
        /// The rejected capacity.
        capacity: usize,
    },

    /// The pool was built outside of a tokio runtime and no runtime handle was provided.
    #[error("no tokio runtime available to execute jobs")]
    NoRuntime,

    /// `next()` was called on an idle pool with nothing left to drain.
    #[error("pool is empty: no active, pending or undrained jobs")]
    EmptyPool,
}

impl PoolError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use jobpool::PoolError;
    ///
    /// let err = PoolError::InvalidConfiguration { capacity: 0 };
    /// assert_eq!(err.as_label(), "pool_invalid_configuration");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PoolError::InvalidConfiguration { .. } => "pool_invalid_configuration",
            PoolError::NoRuntime => "pool_no_runtime",
            PoolError::EmptyPool => "pool_empty",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PoolError::InvalidConfiguration { capacity } => {
                format!("invalid capacity {capacity}; expected at least one slot")
            }
            PoolError::NoRuntime => "pool constructed outside a tokio runtime".to_string(),
            PoolError::EmptyPool => "next() called on an idle, fully drained pool".to_string(),
        }
    }
}

/// # Failure of a single job.
///
/// Reported to the consumer as the error side of [`Outcome::result`](crate::Outcome::result).
/// The pool never retries a failed job.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The job returned an error.
    #[error("job failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The job panicked while running; the slot was released regardless.
    #[error("job panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text (or `"unknown"`).
        info: String,
    },

    /// The job's execution unit was dropped before the job finished, or the job never
    /// got to start, because the runtime running the pool shut down.
    #[error("job abandoned: runtime shut down")]
    Abandoned,
}

impl JobError {
    /// Builds a [`JobError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use jobpool::JobError;
    ///
    /// let err = JobError::fail("connection refused");
    /// assert_eq!(err.to_string(), "job failed: connection refused");
    /// ```
    pub fn fail(error: impl Display) -> Self {
        JobError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Fail { .. } => "job_failed",
            JobError::Panicked { .. } => "job_panicked",
            JobError::Abandoned => "job_abandoned",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            JobError::Fail { error } => format!("error: {error}"),
            JobError::Panicked { info } => format!("panic: {info}"),
            JobError::Abandoned => "abandoned: runtime shut down".to_string(),
        }
    }

    /// True if the job body panicked rather than returning an error.
    pub fn is_panic(&self) -> bool {
        matches!(self, JobError::Panicked { .. })
    }

    /// True if the job was dropped by a shutting-down runtime instead of finishing.
    pub fn is_abandoned(&self) -> bool {
        matches!(self, JobError::Abandoned)
    }
}
