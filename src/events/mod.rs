//! Pool events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the pool and its job units.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Pool::submit`, job units (`pool::runner`), the completion hook,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the listener spawned by `PoolBuilder` (fans out to `SubscriberSet`),
//!   and any receiver obtained through `Pool::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
