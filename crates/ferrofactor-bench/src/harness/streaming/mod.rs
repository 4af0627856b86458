//! Request and result streaming.
//!
//! - [`request`] - Messages flowing from the generator to the dispatcher.
//! - [`generator`] - Cancellable source of random factoring requests.
//! - [`collector`] - Renders completed results as they arrive.
//! - [`coordinator`] - Wires generator, pool and collector into one run.

pub mod collector;
pub mod coordinator;
pub mod generator;
pub mod request;
