use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    config::PoolConfig,
    error::{JobError, PoolError},
    events::{Bus, Event, EventKind},
    jobs::{Job, JobFn, JobId, JobRef, Outcome},
};

use super::{
    builder::PoolBuilder,
    runner,
    state::{PoolStats, QueuedJob, State},
};

/// Shared pool internals: admission state, the outcome channel and the bus.
///
/// Held by the [`Pool`], every [`PoolHandle`] and every running job unit.
pub(super) struct Inner<T> {
    capacity: NonZeroUsize,
    state: Mutex<State<T>>,
    completed: mpsc::UnboundedSender<Outcome<T>>,
    bus: Bus,
    runtime: Handle,
    closed: CancellationToken,
}

impl<T: Send + 'static> Inner<T> {
    fn submit(self: &Arc<Self>, job: JobRef<T>) -> JobId {
        let (id, admitted) = {
            let mut state = self.state.lock();
            let id = JobId(state.next_id);
            state.next_id += 1;

            let name: Arc<str> = Arc::from(job.name());
            self.emit(|| {
                Event::new(EventKind::JobSubmitted)
                    .with_job(name.clone())
                    .with_job_id(id)
            });
            (id, self.dispatch_locked(&mut state, QueuedJob { id, name, job }))
        };

        if let Some(queued) = admitted {
            self.launch(queued);
        }
        id
    }

    /// Admission decision for `queued`: takes a free slot or appends it to the pending queue.
    ///
    /// Caller must hold the state lock; both `submit` and `on_complete` go through here.
    /// Returns the job when it was admitted; the caller launches it after releasing the lock.
    fn dispatch_locked(
        &self,
        state: &mut State<T>,
        queued: QueuedJob<T>,
    ) -> Option<QueuedJob<T>> {
        if state.active < self.capacity.get() {
            state.active += 1;
            self.emit(|| {
                Event::new(EventKind::JobStarting)
                    .with_job(queued.name.clone())
                    .with_job_id(queued.id)
                    .with_load(state.active, state.pending.len())
            });
            Some(queued)
        } else {
            self.emit(|| {
                Event::new(EventKind::JobQueued)
                    .with_job(queued.name.clone())
                    .with_job_id(queued.id)
                    .with_load(state.active, state.pending.len() + 1)
            });
            state.pending.push_back(queued);
            None
        }
    }

    /// Spawns the execution unit of an admitted job.
    ///
    /// Must not be called with the state lock held: a shutting-down runtime drops the
    /// unit inside `spawn`, and the unit's guard re-enters the pool.
    fn launch(self: &Arc<Self>, queued: QueuedJob<T>) {
        let guard = UnitGuard {
            inner: Arc::clone(self),
            id: queued.id,
            name: queued.name.clone(),
            started: Instant::now(),
            done: false,
        };
        self.runtime.spawn(async move {
            let outcome = runner::run_job(queued, &guard.inner.bus).await;
            guard.complete(outcome);
        });
    }

    /// Completion hook: release the slot, admit the next pending job, then publish the outcome.
    ///
    /// The outcome is sent after the lock is released; it is already counted as
    /// `undrained`, so `has_more_work` stays true until the consumer takes it.
    fn on_complete(self: &Arc<Self>, outcome: Outcome<T>) {
        let admitted = {
            let mut state = self.state.lock();
            debug_assert!(state.active > 0, "completion without an active job");
            state.active -= 1;
            state.undrained += 1;

            match state.pending.pop_front() {
                Some(next) => self.dispatch_locked(&mut state, next),
                None => {
                    if state.active == 0 {
                        self.emit(|| Event::new(EventKind::PoolIdle).with_load(0, 0));
                    }
                    None
                }
            }
        };

        self.deliver(outcome);
        if let Some(queued) = admitted {
            self.launch(queued);
        }
    }

    /// Hook for a unit dropped before it finished (its runtime shut down).
    ///
    /// Releases the slot and fails the job with [`JobError::Abandoned`]. Nothing queued can
    /// run any more, so every pending job is failed the same way instead of being launched.
    fn on_abandoned(&self, id: JobId, name: Arc<str>, elapsed: Duration) {
        let mut lost = vec![(id, name, elapsed)];
        let dropped_jobs: Vec<QueuedJob<T>> = {
            let mut state = self.state.lock();
            state.active = state.active.saturating_sub(1);
            let pending: Vec<QueuedJob<T>> = state.pending.drain(..).collect();
            state.undrained += 1 + pending.len();

            lost.extend(pending.iter().map(|q| (q.id, q.name.clone(), Duration::ZERO)));
            for (id, name, elapsed) in &lost {
                self.emit(|| {
                    Event::new(EventKind::JobFailed)
                        .with_job(name.clone())
                        .with_job_id(*id)
                        .with_elapsed(*elapsed)
                        .with_reason(JobError::Abandoned.to_string())
                });
            }
            if state.active == 0 {
                self.emit(|| Event::new(EventKind::PoolIdle).with_load(0, 0));
            }
            pending
        };
        drop(dropped_jobs);

        tracing::warn!(
            job = %id,
            abandoned = lost.len(),
            "job unit dropped before completion; failing it and the pending queue"
        );
        for (id, name, elapsed) in lost {
            self.deliver(Outcome {
                id,
                name,
                result: Err(JobError::Abandoned),
                elapsed,
            });
        }
    }

    /// Sends an outcome already counted as `undrained` to the consumer.
    fn deliver(&self, outcome: Outcome<T>) {
        if let Err(mpsc::error::SendError(lost)) = self.completed.send(outcome) {
            self.state.lock().undrained -= 1;
            tracing::debug!(job = %lost.name, id = %lost.id, "outcome discarded: pool dropped");
        }
    }
}

impl<T> Inner<T> {
    /// Publishes the event built by `make`, skipping construction when nobody listens.
    fn emit(&self, make: impl FnOnce() -> Event) {
        if self.bus.has_receivers() {
            self.bus.publish(make());
        }
    }

    fn has_more_work(&self) -> bool {
        self.state.lock().has_more_work()
    }

    fn stats(&self) -> PoolStats {
        self.state.lock().stats(self.capacity.get())
    }

    fn mark_drained(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.undrained > 0, "drained more outcomes than produced");
        state.undrained = state.undrained.saturating_sub(1);
    }
}

/// Owned by every running job unit.
///
/// Routes the outcome into the completion hook; if the unit is dropped first
/// (runtime shutdown), reports the job as abandoned so its slot is not leaked.
struct UnitGuard<T: Send + 'static> {
    inner: Arc<Inner<T>>,
    id: JobId,
    name: Arc<str>,
    started: Instant,
    done: bool,
}

impl<T: Send + 'static> UnitGuard<T> {
    fn complete(mut self, outcome: Outcome<T>) {
        self.done = true;
        self.inner.on_complete(outcome);
    }
}

impl<T: Send + 'static> Drop for UnitGuard<T> {
    fn drop(&mut self) {
        if !self.done {
            self.inner
                .on_abandoned(self.id, Arc::clone(&self.name), self.started.elapsed());
        }
    }
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}

/// # Bounded worker pool.
///
/// Runs at most `capacity` jobs at a time; overflow waits in an unbounded FIFO queue.
/// Finished jobs are handed back through [`next`](Pool::next) in **completion order**.
///
/// ## Contract
/// - [`submit`](Pool::submit) never blocks.
/// - Every submitted job produces exactly one [`Outcome`], success or failure.
/// - One consumer drains the pool: [`next`](Pool::next) takes `&mut self`. Other producers
///   submit through a cloneable [`PoolHandle`].
/// - Batch protocol: submit everything, then drain while [`has_more_work`](Pool::has_more_work)
///   is true. A `false` answer is final only once no more submissions can happen.
///
/// ## Example
/// ```no_run
/// use std::time::Duration;
/// use jobpool::{JobError, Pool};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut pool = Pool::<u64>::new(2)?;
///
///     for ms in [100u64, 100, 10, 10, 10] {
///         pool.submit_fn(format!("sleep-{ms}"), move || async move {
///             tokio::time::sleep(Duration::from_millis(ms)).await;
///             Ok::<_, JobError>(ms)
///         });
///     }
///
///     while pool.has_more_work() {
///         let outcome = pool.next().await?;
///         println!("{} {} -> {:?}", outcome.id, outcome.name, outcome.result);
///     }
///     Ok(())
/// }
/// ```
pub struct Pool<T> {
    inner: Arc<Inner<T>>,
    completed: mpsc::UnboundedReceiver<Outcome<T>>,
    listener: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Pool<T> {
    /// Creates a pool with `capacity` slots and default settings.
    ///
    /// Fails with [`PoolError::InvalidConfiguration`] if `capacity == 0` and with
    /// [`PoolError::NoRuntime`] when called outside a tokio runtime.
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        PoolBuilder::new(PoolConfig::with_capacity(capacity)).build()
    }

    /// Returns a builder for a pool with subscribers or an explicit runtime.
    ///
    /// The job output type is fixed here: `Pool::<T>::builder(cfg)...build()`.
    pub fn builder(cfg: PoolConfig) -> PoolBuilder<T> {
        PoolBuilder::new(cfg)
    }

    pub(super) fn from_parts(
        capacity: NonZeroUsize,
        bus: Bus,
        runtime: Handle,
        closed: CancellationToken,
        listener: Option<JoinHandle<()>>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            capacity,
            state: Mutex::new(State::new()),
            completed: tx,
            bus,
            runtime,
            closed,
        });
        Self {
            inner,
            completed: rx,
            listener,
        }
    }

    /// Submits a job: starts it now if a slot is free, otherwise queues it.
    pub fn submit<J: Job<T>>(&self, job: J) -> JobId {
        self.inner.submit(Box::new(job))
    }

    /// Submits a closure-backed job.
    pub fn submit_fn<F, Fut>(&self, name: impl Into<Cow<'static, str>>, f: F) -> JobId
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, JobError>> + Send + 'static,
    {
        self.submit(JobFn::new(name, f))
    }

    /// Submits every job of `jobs` in iteration order.
    pub fn submit_all<I, J>(&self, jobs: I) -> Vec<JobId>
    where
        I: IntoIterator<Item = J>,
        J: Job<T>,
    {
        jobs.into_iter().map(|job| self.submit(job)).collect()
    }

    /// Waits for the next finished job and returns its outcome.
    ///
    /// Outcomes arrive in completion order. Returns [`PoolError::EmptyPool`] instead of
    /// waiting forever when nothing is running, queued, or left to drain.
    pub async fn next(&mut self) -> Result<Outcome<T>, PoolError> {
        if !self.inner.has_more_work() {
            return Err(PoolError::EmptyPool);
        }
        // The sender lives in `inner`, so the channel cannot close under us.
        let outcome = self.completed.recv().await.ok_or(PoolError::EmptyPool)?;
        self.inner.mark_drained();
        Ok(outcome)
    }

    /// Takes an already finished outcome without waiting.
    pub fn try_next(&mut self) -> Option<Outcome<T>> {
        let outcome = self.completed.try_recv().ok()?;
        self.inner.mark_drained();
        Some(outcome)
    }

    /// Returns a cloneable handle for submitting from other tasks or threads.
    pub fn handle(&self) -> PoolHandle<T> {
        PoolHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Flushes subscribers and releases the pool.
    ///
    /// Waits until every event published so far has been handed to the configured
    /// subscribers. Jobs still running finish on their own; their outcomes are discarded.
    pub async fn finish(mut self) {
        self.inner.closed.cancel();
        if let Some(listener) = self.listener.take() {
            if let Err(e) = listener.await {
                tracing::warn!(error = %e, "event listener terminated abnormally");
            }
        }
    }
}

impl<T> Pool<T> {
    /// True while any job is running, queued, or finished but not drained.
    ///
    /// Advisory: use it as the stopping condition of a drain loop once all jobs
    /// have been submitted, not as "a result is ready right now".
    pub fn has_more_work(&self) -> bool {
        self.inner.has_more_work()
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.inner.capacity.get()
    }

    /// Snapshot of the admission state.
    pub fn stats(&self) -> PoolStats {
        self.inner.stats()
    }

    /// Jobs currently executing.
    pub fn active(&self) -> usize {
        self.stats().active
    }

    /// Jobs waiting for a slot.
    pub fn pending(&self) -> usize {
        self.stats().pending
    }

    /// Finished jobs not yet returned by `next`.
    pub fn undrained(&self) -> usize {
        self.stats().undrained
    }

    /// True when every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.stats().is_full()
    }

    /// Subscribes to pool events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool").field("stats", &self.stats()).finish()
    }
}

/// Cloneable producer handle.
///
/// Can submit and inspect, but not drain; outcomes of jobs submitted here are
/// returned by the owning [`Pool`].
pub struct PoolHandle<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for PoolHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> PoolHandle<T> {
    /// Submits a job (see [`Pool::submit`]).
    pub fn submit<J: Job<T>>(&self, job: J) -> JobId {
        self.inner.submit(Box::new(job))
    }

    /// Submits a closure-backed job (see [`Pool::submit_fn`]).
    pub fn submit_fn<F, Fut>(&self, name: impl Into<Cow<'static, str>>, f: F) -> JobId
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, JobError>> + Send + 'static,
    {
        self.submit(JobFn::new(name, f))
    }
}

impl<T> PoolHandle<T> {
    /// See [`Pool::has_more_work`].
    pub fn has_more_work(&self) -> bool {
        self.inner.has_more_work()
    }

    /// See [`Pool::stats`].
    pub fn stats(&self) -> PoolStats {
        self.inner.stats()
    }

    /// See [`Pool::is_full`].
    pub fn is_full(&self) -> bool {
        self.stats().is_full()
    }
}
