//! # Function-backed job (`JobFn`)
//!
//! [`JobFn`] wraps a closure `F: FnOnce() -> Fut`. The closure is called once, when the
//! pool admits the job into a slot, and the returned future is awaited to completion.
//!
//! ## Example
//! ```rust
//! use jobpool::{Job, JobError, JobFn, JobRef};
//!
//! let app_id = String::from("3f2a");
//! let job: JobRef<usize> = JobFn::boxed("scan-3f2a", move || async move {
//!     Ok::<_, JobError>(app_id.len())
//! });
//!
//! assert_eq!(job.name(), "scan-3f2a");
//! ```

use std::borrow::Cow;
use std::future::Future;

use crate::error::JobError;
use crate::jobs::job::{BoxJobFuture, Job, JobRef};

/// Function-backed job implementation.
pub struct JobFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> JobFn<F> {
    /// Creates a new function-backed job.
    ///
    /// Prefer [`JobFn::boxed`] when you immediately need a [`JobRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the job and returns it as an owned handle (`Box<dyn Job<T>>`).
    pub fn boxed<T, Fut>(name: impl Into<Cow<'static, str>>, f: F) -> JobRef<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, JobError>> + Send + 'static,
    {
        Box::new(Self::new(name, f))
    }
}

impl<F> std::fmt::Debug for JobFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobFn").field("name", &self.name).finish()
    }
}

impl<T, F, Fut> Job<T> for JobFn<F>
where
    T: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static, // FnOnce: runs exactly once
    Fut: Future<Output = Result<T, JobError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn start(self: Box<Self>) -> BoxJobFuture<T> {
        Box::pin((self.f)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_job_fn_runs_closure_once() {
        let data = vec![1u32, 2, 3];
        let job: JobRef<u32> = JobFn::boxed("sum", move || async move {
            Ok::<u32, JobError>(data.iter().sum())
        });

        assert_eq!(job.name(), "sum");
        assert_eq!(job.start().await, Ok(6));
    }

    #[tokio::test]
    async fn test_job_fn_propagates_failure() {
        let job = JobFn::boxed("broken", || async { Err::<(), _>(JobError::fail("nope")) });
        assert_eq!(job.start().await, Err(JobError::fail("nope")));
    }
}
