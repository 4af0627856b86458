//! Capacity-bounded factoring.
//!
//! - [`manager`] - Dispatches requests onto the blocking pool, at most
//!   `concurrency` at a time.
//! - [`worker`] - A single factoring unit.
//! - [`stats`] - Counters shared between the dispatcher and its units.

pub mod manager;
pub mod stats;
pub mod worker;
