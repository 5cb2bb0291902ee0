//! # Job abstraction.
//!
//! This module defines the [`Job`] trait: a named, one-shot unit of async work that
//! produces a value of type `T` or fails with a [`JobError`].
//! The common handle type is [`JobRef`], a `Box<dyn Job<T>>` the pool keeps in its
//! pending queue until a slot frees up.
//!
//! Jobs are consumed when started (`self: Box<Self>`), so a job can move owned data
//! into its future and is never executed twice.

use std::future::Future;
use std::pin::Pin;

use crate::error::JobError;

/// Boxed future returned by [`Job::start`].
pub type BoxJobFuture<T> = Pin<Box<dyn Future<Output = Result<T, JobError>> + Send + 'static>>;

/// Owned, type-erased job handle.
pub type JobRef<T> = Box<dyn Job<T>>;

/// # One-shot asynchronous unit of work.
///
/// The pool never inspects a job beyond its [`name`](Job::name); it only starts it once
/// a slot is available and awaits the returned future on its own execution unit.
///
/// # Example
/// ```
/// use jobpool::{BoxJobFuture, Job, JobError};
///
/// struct ScanApp {
///     app_id: String,
/// }
///
/// impl Job<usize> for ScanApp {
///     fn name(&self) -> &str {
///         &self.app_id
///     }
///
///     fn start(self: Box<Self>) -> BoxJobFuture<usize> {
///         Box::pin(async move {
///             if self.app_id.is_empty() {
///                 return Err(JobError::fail("empty app id"));
///             }
///             Ok(self.app_id.len())
///         })
///     }
/// }
/// ```
pub trait Job<T>: Send + 'static {
    /// Returns a human-readable job name (used in events and outcomes).
    fn name(&self) -> &str;

    /// Consumes the job and returns the future that performs the work.
    ///
    /// Called exactly once, from inside the execution unit the pool dispatched,
    /// so panics raised here are captured like panics in the future itself.
    fn start(self: Box<Self>) -> BoxJobFuture<T>;
}

impl<T: 'static> Job<T> for JobRef<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn start(self: Box<Self>) -> BoxJobFuture<T> {
        let inner: JobRef<T> = *self;
        inner.start()
    }
}
