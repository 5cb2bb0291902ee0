//! # Job abstractions and outcomes.
//!
//! This module provides the job-related types:
//! - [`Job`] - trait for one-shot async units of work
//! - [`JobFn`] - closure-based job implementation
//! - [`JobRef`] - owned, type-erased job handle (`Box<dyn Job<T>>`)
//! - [`JobId`], [`Outcome`] - identity and tagged result of a finished job

mod job;
mod job_fn;
mod outcome;

pub use job::{BoxJobFuture, Job, JobRef};
pub use job_fn::JobFn;
pub use outcome::{JobId, Outcome};
