//! # Batch driver: submit everything, then drain until idle.
//!
//! [`BatchReport`] aggregates the outcomes of one batch. A failed job never aborts the
//! drain; it is counted and kept alongside the successes.
//!
//! ```text
//! submit_all(jobs) ──► drain_with(|i, outcome| progress) ──► BatchReport
//!                       while has_more_work() { next().await? }
//! ```

use std::time::{Duration, Instant};

use crate::{error::PoolError, jobs::Outcome};

use super::core::Pool;

/// Outcomes of one submit-then-drain cycle.
#[derive(Debug)]
pub struct BatchReport<T> {
    /// Successful outcomes, in completion order.
    pub succeeded: Vec<Outcome<T>>,
    /// Failed outcomes, in completion order.
    pub failed: Vec<Outcome<T>>,
    /// Wall time spent draining.
    pub elapsed: Duration,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }
}

impl<T> BatchReport<T> {
    fn push(&mut self, outcome: Outcome<T>) {
        if outcome.is_ok() {
            self.succeeded.push(outcome);
        } else {
            self.failed.push(outcome);
        }
    }

    /// Number of drained outcomes.
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Borrowed success values, in completion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.succeeded.iter().filter_map(Outcome::value)
    }

    /// Owned success values, in completion order.
    pub fn into_values(self) -> Vec<T> {
        self.succeeded
            .into_iter()
            .filter_map(|o| o.into_result().ok())
            .collect()
    }

    /// One-line summary, e.g. `batch: 12 jobs, 11 succeeded, 1 failed in 1.20s`.
    pub fn summary(&self) -> String {
        format!(
            "batch: {} jobs, {} succeeded, {} failed in {:.2?}",
            self.total(),
            self.success_count(),
            self.failure_count(),
            self.elapsed
        )
    }
}

impl<T: Send + 'static> Pool<T> {
    /// Drains the pool until it is idle and collects every outcome.
    ///
    /// Call after all jobs of the batch have been submitted.
    pub async fn drain(&mut self) -> Result<BatchReport<T>, PoolError> {
        self.drain_with(|_, _| {}).await
    }

    /// Like [`drain`](Pool::drain), calling `on_outcome(index, &outcome)` for each
    /// drained outcome (index counts from 0 in drain order).
    pub async fn drain_with<F>(&mut self, mut on_outcome: F) -> Result<BatchReport<T>, PoolError>
    where
        F: FnMut(usize, &Outcome<T>),
    {
        let started = Instant::now();
        let mut report = BatchReport::default();

        while self.has_more_work() {
            let outcome = self.next().await?;
            on_outcome(report.total(), &outcome);
            report.push(outcome);
        }

        report.elapsed = started.elapsed();
        Ok(report)
    }
}

/// Progress glyph for the `i`-th drained result.
///
/// Every 100th result starts a new line prefixed with the running count,
/// every 10th prints `|`, the rest print `.`:
///
/// ```text
/// 0 |.........|.........|...
/// 100 |.........|....
/// ```
///
/// # Example
/// ```
/// use jobpool::progress_symbol;
///
/// assert_eq!(progress_symbol(0), "0 |");
/// assert_eq!(progress_symbol(7), ".");
/// assert_eq!(progress_symbol(30), "|");
/// assert_eq!(progress_symbol(200), "\n200 |");
/// ```
pub fn progress_symbol(i: usize) -> String {
    if i % 100 == 0 {
        let newline = if i != 0 { "\n" } else { "" };
        format!("{newline}{i} |")
    } else if i % 10 == 0 {
        "|".to_string()
    } else {
        ".".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::JobError;
    use crate::jobs::JobId;

    fn outcome(id: u64, result: Result<u32, JobError>) -> Outcome<u32> {
        Outcome {
            id: JobId(id),
            name: Arc::from(format!("job-{id}")),
            result,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_report_splits_by_result() {
        let mut report = BatchReport::default();
        report.push(outcome(0, Ok(5)));
        report.push(outcome(1, Err(JobError::fail("down"))));
        report.push(outcome(2, Ok(7)));

        assert_eq!(report.total(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.values().copied().collect::<Vec<_>>(), vec![5, 7]);
        assert!(report.summary().starts_with("batch: 3 jobs, 2 succeeded, 1 failed in "));
        assert_eq!(report.into_values(), vec![5, 7]);
    }

    #[test]
    fn test_progress_symbols() {
        let line: String = (0..25).map(progress_symbol).collect();
        assert_eq!(line, "0 |.........|.........|....");
        assert_eq!(progress_symbol(100), "\n100 |");
        assert_eq!(progress_symbol(110), "|");
    }
}
