//! # Event bus for broadcasting pool events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from multiple sources (`submit`, job units,
//! completion hooks, subscriber workers).
//!
//! ## Architecture
//! ```text
//! Publishers (many):                     Subscribers:
//!   Pool::submit    ──┐
//!   job unit #1     ──┼──────► Bus ───────► listener ────► SubscriberSet
//!   job unit #N     ──┤  (broadcast chan)   (spawned by PoolBuilder)
//!   completion hook ──┘                 └──► Pool::subscribe() receivers
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active subscribers at send time.
//!
//! Losing events never affects pool semantics: outcomes travel on their own channel.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for pool events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// A receiver only gets events **sent after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// True if at least one receiver is listening.
    ///
    /// Lets hot paths skip building events nobody will see.
    #[inline]
    pub fn has_receivers(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}
