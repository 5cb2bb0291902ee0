//! # Event subscribers for the pool.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! built-in subscribers for events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Pool / job units ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                                  │
//!                                                   ┌──────────────┼──────────────┐
//!                                                   ▼              ▼              ▼
//!                                               LogWriter   ActivityTracker    Custom
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers** - observe and react to events (logging, metrics, alerts)
//! - **Stateful subscribers** - maintain internal state based on events (ActivityTracker)

mod activity;
#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

pub use activity::{ActivityCounts, ActivityTracker};
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
