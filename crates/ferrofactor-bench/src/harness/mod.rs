//! Benchmark pipeline: configuration, telemetry, request streaming and the
//! worker pool.
//!
//! ## Structure
//!
//! - [`config`] - Command line and environment parsing.
//! - [`telemetry`] - `tracing` subscriber initialization.
//! - [`streaming`] - Generator, collector and coordinator tasks.
//! - [`pool`] - Capacity-bounded factoring units.

pub mod config;
pub mod pool;
pub mod streaming;
pub mod telemetry;
