//! # Bounded worker pool.
//!
//! ```text
//!   submit(job) ─► [lock] slot free? ──yes──► active += 1 ─► [unlock] spawn unit ─► run_job
//!                           │                                                │
//!                           no                                               ▼
//!                           ▼                                        on_complete [lock]
//!                    pending.push_back                          active -= 1, undrained += 1
//!                           ▲                                    admit pending head (FIFO)
//!                           └──────────────── pop_front ◄────────────────────┘
//!                                                                            │
//!   next() ◄──────────────── completion channel (completion order) ◄─────────┘
//! ```
//!
//! - [`Pool`]: owns the completion stream; the single consumer.
//! - [`PoolHandle`]: cloneable producer for other tasks/threads.
//! - [`PoolBuilder`]: configuration, subscribers, runtime.
//! - [`BatchReport`]: result of [`Pool::drain`].

mod batch;
mod builder;
mod core;
mod runner;
mod state;

#[cfg(test)]
mod tests;

pub use batch::{BatchReport, progress_symbol};
pub use builder::PoolBuilder;
pub use core::{Pool, PoolHandle};
pub(crate) use runner::panic_message;
pub use state::PoolStats;
