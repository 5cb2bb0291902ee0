//! # jobpool
//!
//! **jobpool** is a bounded worker pool for async jobs on tokio.
//!
//! At most `capacity` jobs run at the same time; overflow waits in a FIFO queue and
//! is admitted as slots free up. Finished jobs are handed back one at a time, in
//! completion order, as tagged [`Outcome`]s. A failed or panicking job is an outcome
//! like any other and never takes the pool down.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  Job (#0)    │   │  Job (#1)    │   │  Job (#2)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ submit           ▼ submit           ▼ submit
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Pool (admission state under one mutex)                           │
//! │  - active:    occupied slots (0..=capacity)                       │
//! │  - pending:   FIFO of jobs waiting for a slot                     │
//! │  - undrained: finished, outcome not yet taken                     │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼ spawn            ▼ spawn            │ queued        │
//!     ┌──────────────┐   ┌──────────────┐      │               │
//!     │  job unit    │   │  job unit    │      │               │
//!     │ (run_job)    │   │ (run_job)    │      │               │
//!     └┬─────────────┘   └┬─────────────┘      │               │
//!      │ on_complete:     │                    │               │
//!      │ free slot,       │                    │               │
//!      │ admit head ──────┼────────────────────┘               │
//!      ▼                  ▼                                    │
//! ┌──────────────────────────────────┐                         │
//! │  completion channel (unbounded)  │                         │
//! └────────────────┬─────────────────┘                         │
//!                  ▼                                           ▼
//!          Pool::next() / drain()          Bus (broadcast) ──► listener ──► SubscriberSet
//!                                                                       ┌─────────┼─────────┐
//!                                                                       ▼         ▼         ▼
//!                                                                  LogWriter  Activity   custom
//! ```
//!
//! ### Batch protocol
//! ```text
//! for job in jobs { pool.submit(job) }        // never blocks
//! while pool.has_more_work() {                // running | pending | undrained
//!     let outcome = pool.next().await?;       // completion order
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                        | Key types / traits                         |
//! |-------------------|--------------------------------------------------------------------|--------------------------------------------|
//! | **Pool**          | Bounded admission, FIFO queue, completion-ordered results.         | [`Pool`], [`PoolHandle`], [`PoolStats`]    |
//! | **Jobs**          | Define jobs as trait objects or closures.                          | [`Job`], [`JobFn`], [`JobRef`], [`Outcome`]|
//! | **Batches**       | Submit-then-drain helper with progress callback and summary.       | [`BatchReport`], [`progress_symbol`]       |
//! | **Subscriber API**| Hook into pool events (logging, activity tracking, custom).         | [`Subscribe`], [`ActivityTracker`]         |
//! | **Errors**        | Typed errors for pool usage and job execution.                     | [`PoolError`], [`JobError`]                |
//! | **Configuration** | Capacity and event bus settings.                                   | [`PoolConfig`], [`PoolBuilder`]            |
//!
//! ## Optional features
//! - `logging` _(default)_: exports the built-in [`LogWriter`] subscriber.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use jobpool::{JobError, Pool, PoolConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn jobpool::Subscribe>> = vec![Arc::new(jobpool::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn jobpool::Subscribe>> = Vec::new();
//!
//!     let mut pool = Pool::<u64>::builder(PoolConfig::with_capacity(2))
//!         .with_subscribers(subs)
//!         .build()?;
//!
//!     for ms in [30u64, 10, 20] {
//!         pool.submit_fn(format!("sleep-{ms}"), move || async move {
//!             tokio::time::sleep(Duration::from_millis(ms)).await;
//!             Ok::<_, JobError>(ms)
//!         });
//!     }
//!
//!     let report = pool.drain().await?;
//!     assert_eq!(report.success_count(), 3);
//!     println!("{}", report.summary());
//!
//!     pool.finish().await;
//!     Ok(())
//! }
//! ```
mod config;
mod error;
mod events;
mod jobs;
mod pool;
mod subscribers;

// ---- Public re-exports ----

pub use config::PoolConfig;
pub use error::{JobError, PoolError};
pub use events::{Bus, Event, EventKind};
pub use jobs::{BoxJobFuture, Job, JobFn, JobId, JobRef, Outcome};
pub use pool::{BatchReport, Pool, PoolBuilder, PoolHandle, PoolStats, progress_symbol};
pub use subscribers::{ActivityCounts, ActivityTracker, Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber.
// Enabled by default; disable with `--no-default-features`.
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
