//! # Pool configuration.
//!
//! Provides [`PoolConfig`] centralized settings for a [`Pool`](crate::Pool).
//!
//! Config is used in two ways:
//! 1. **Quick construction**: `Pool::new(capacity)` (defaults for everything else)
//! 2. **Builder**: `Pool::<T>::builder(config).with_subscribers(..).build()`
//!
//! ## Validation
//! - `capacity = 0` → rejected with [`PoolError::InvalidConfiguration`]
//! - `bus_capacity = 0` → clamped to 1

use std::num::NonZeroUsize;

use crate::error::PoolError;

/// Configuration for a bounded worker pool.
///
/// ## Field semantics
/// - `capacity`: number of slots, i.e. the hard cap on concurrently executing jobs (must be > 0)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum number of jobs executing at the same time.
    ///
    /// Fixed for the lifetime of the pool. Jobs submitted while every slot is
    /// busy wait in an unbounded FIFO queue.
    pub capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events skip
    /// older items. Minimum value is 1.
    pub bus_capacity: usize,
}

impl PoolConfig {
    /// Default configuration with the given number of slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Checks the configuration and returns the slot count.
    ///
    /// # Example
    /// ```
    /// use jobpool::{PoolConfig, PoolError};
    ///
    /// assert!(PoolConfig::with_capacity(4).validate().is_ok());
    /// assert_eq!(
    ///     PoolConfig::with_capacity(0).validate(),
    ///     Err(PoolError::InvalidConfiguration { capacity: 0 })
    /// );
    /// ```
    pub fn validate(&self) -> Result<NonZeroUsize, PoolError> {
        NonZeroUsize::new(self.capacity).ok_or(PoolError::InvalidConfiguration {
            capacity: self.capacity,
        })
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `capacity = 8`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            capacity: 8,
            bus_capacity: 1024,
        }
    }
}
