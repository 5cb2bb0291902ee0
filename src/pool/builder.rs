use std::marker::PhantomData;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    config::PoolConfig,
    error::PoolError,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

use super::core::Pool;

/// Builder for constructing a [`Pool`] with optional subscribers.
///
/// `T` is the success type of the jobs the pool will run.
pub struct PoolBuilder<T> {
    cfg: PoolConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    runtime: Option<Handle>,
    _output: PhantomData<fn() -> T>,
}

impl<T: Send + 'static> PoolBuilder<T> {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: PoolConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            runtime: None,
            _output: PhantomData,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive pool events (submission, admission, completion)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Runs jobs on the given runtime instead of the ambient one.
    ///
    /// Lets a pool be built and fed from threads outside any runtime.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the pool.
    ///
    /// Validates the configuration, resolves the runtime, creates the event bus and,
    /// if subscribers were given, spawns the listener that fans events out to them.
    pub fn build(self) -> Result<Pool<T>, PoolError> {
        let capacity = self.cfg.validate()?;
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| PoolError::NoRuntime)?,
        };

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let closed = CancellationToken::new();

        let listener = if self.subscribers.is_empty() {
            None
        } else {
            Some(spawn_listener(
                &runtime,
                bus.clone(),
                self.subscribers,
                closed.clone(),
            ))
        };

        Ok(Pool::from_parts(capacity, bus, runtime, closed, listener))
    }
}

/// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
///
/// On close, forwards whatever is still buffered and waits for subscriber workers to drain.
fn spawn_listener(
    runtime: &Handle,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    closed: CancellationToken,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    let set = SubscriberSet::new(subscribers, bus, runtime);

    runtime.spawn(async move {
        loop {
            tokio::select! {
                _ = closed.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event listener lagged; events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }

        while let Ok(ev) = rx.try_recv() {
            set.emit(&ev);
        }
        set.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_outside_runtime_fails() {
        let res = PoolBuilder::<u8>::new(PoolConfig::with_capacity(2)).build();
        assert_eq!(res.err(), Some(PoolError::NoRuntime));
    }

    #[test]
    fn test_capacity_checked_before_runtime() {
        let res = PoolBuilder::<u8>::new(PoolConfig::with_capacity(0)).build();
        assert_eq!(
            res.err(),
            Some(PoolError::InvalidConfiguration { capacity: 0 })
        );
    }

    #[test]
    fn test_explicit_runtime_handle() {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .build()
            .expect("runtime");

        let mut pool = PoolBuilder::<u32>::new(PoolConfig::with_capacity(2))
            .with_runtime(rt.handle().clone())
            .build()
            .expect("pool");

        // Submitted from a plain thread, executed on `rt`.
        for i in 0..4u32 {
            pool.submit_fn(format!("job-{i}"), move || async move {
                Ok::<_, crate::JobError>(i * 10)
            });
        }

        let report = rt.block_on(pool.drain()).expect("drain");
        let mut values: Vec<u32> = report.values().copied().collect();
        values.sort_unstable();
        assert_eq!(values, vec![0, 10, 20, 30]);
    }
}
