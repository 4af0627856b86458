//! Error types for factoring and prime file handling.
//!
//! Every variant is treated as fatal by the benchmark harness: there is no
//! retry or degraded mode. The enum exists so that failures travel back to a
//! single top-level handler instead of terminating the process where they
//! occur.
//!
//! ## Error Cases
//! - `Io`: A prime file could not be created, opened, read or written.
//! - `RecordOverflow`, `TruncatedRecord`, `MalformedRecord`: The on-disk
//!   record format was violated.
//! - `EmptyPrimeFile`: A prime file holds no records.
//! - `UnknownMethod` and the `Invalid*` variants: Rejected run configuration.
//! - `ChannelError`: An internal handoff between tasks or threads broke.
//! - `WorkerPanicked`: A factoring unit panicked.

use std::path::PathBuf;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for the factoring pipeline.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// An I/O operation on a prime file failed.
    #[error("I/O error ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The factoring method name is not one of the supported strategies.
    #[error("unknown method: {name}")]
    UnknownMethod { name: String },

    /// A value does not fit in a fixed-width record.
    #[error("value {value} does not fit in an 8 byte record")]
    RecordOverflow { value: u64 },

    /// A record (or a block of records) ended mid-way.
    #[error("truncated record: got {len} bytes, expected a multiple of 8")]
    TruncatedRecord { len: usize },

    /// A record did not hold a terminated varint.
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: &'static str },

    /// The prime file holds no records at all.
    #[error("prime file {} is empty", path.display())]
    EmptyPrimeFile { path: PathBuf },

    /// Block sizes must be a non-zero multiple of the record size.
    #[error("invalid block size {size}: must be a non-zero multiple of 8")]
    InvalidBlockSize { size: usize },

    /// Prime file bit-length limit out of range.
    #[error("invalid limit {limit}: must be between 1 and {max}")]
    InvalidLimit { limit: u32, max: u32 },

    /// Right shift applied to random operands out of range.
    #[error("invalid shift {shift}: must be at most 63")]
    InvalidShift { shift: u32 },

    /// The worker pool needs at least one slot.
    #[error("concurrency must be greater than 0")]
    InvalidConcurrency,

    /// The buffer between factoring units and the result sink needs room for
    /// at least one result.
    #[error("result buffer size must be greater than 0")]
    InvalidResultBufferSize,

    /// Internal channel send/receive failure.
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// A factoring unit or pipeline task panicked or was aborted.
    #[error("worker failed: {reason}")]
    WorkerPanicked { reason: String },
}

impl Error {
    /// Wraps an [`std::io::Error`] with a short description of the operation.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}
