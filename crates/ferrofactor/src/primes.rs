//! Prime file generation.
//!
//! [`PrimeFileGenerator`] computes every prime below `2^limit` by trial
//! division and persists them in ascending order. The work is split between
//! two threads joined by a bounded channel:
//!
//! - a producer that scans candidates with [`is_prime`] and hands primes off,
//! - a writer that owns the file exclusively, encodes each prime with
//!   [`codec::encode`] and appends it.
//!
//! The producer closes the handoff when the scan reaches the limit; the writer
//! drains whatever is left, flushes and closes the file.

use crate::{
    DEFAULT_BLOCK_SIZE, Error, PrimeCacheReader, Result,
    codec::{self, MAX_RECORD_VALUE, RECORD_SIZE},
    factor::is_prime,
};
use crossbeam_channel::{Receiver, Sender, bounded};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    thread,
};

/// Largest supported bit-length limit. Every prime below `2^MAX_LIMIT` fits in
/// a single record.
pub const MAX_LIMIT: u32 = MAX_RECORD_VALUE.count_ones();

/// Default number of primes buffered between producer and writer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

// Progress is logged each time the scan crosses a multiple of this.
#[cfg(feature = "tracing")]
const PROGRESS_INTERVAL: u64 = 1 << 16;

/// Outcome of a completed generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerateSummary {
    /// Number of primes written.
    pub count: u64,
    /// File size in bytes.
    pub bytes: u64,
    /// Largest prime written, if any.
    pub largest: Option<u64>,
}

/// Writes every prime below `2^limit` to a prime file.
///
/// # Example
///
/// ```no_run
/// use ferrofactor::{PrimeFileGenerator, read_prime_file};
///
/// let summary = PrimeFileGenerator::new("primes.bin", 8).generate()?;
/// assert_eq!(summary.count, 54);
/// assert_eq!(read_prime_file("primes.bin")?.last(), Some(&251));
/// # Ok::<(), ferrofactor::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct PrimeFileGenerator {
    path: PathBuf,
    limit: u32,
    channel_capacity: usize,
}

impl PrimeFileGenerator {
    pub fn new(path: impl Into<PathBuf>, limit: u32) -> Self {
        Self {
            path: path.into(),
            limit,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Sets how many primes may queue between the producer and the writer.
    /// A capacity of zero makes every handoff a rendezvous.
    #[must_use]
    pub const fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Runs the producer and writer to completion.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidLimit`] if `limit` is 0 or above [`MAX_LIMIT`].
    /// - [`Error::Io`] if the file cannot be created or written.
    pub fn generate(&self) -> Result<GenerateSummary> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            return Err(Error::InvalidLimit {
                limit: self.limit,
                max: MAX_LIMIT,
            });
        }

        let file = File::create(&self.path)
            .map_err(|e| Error::io(format!("creating {}", self.path.display()), e))?;
        let until = 1_u64 << self.limit;
        let (tx, rx) = bounded(self.channel_capacity);

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Generating primes below 2^{} into {}",
            self.limit,
            self.path.display()
        );

        let summary = thread::scope(|s| {
            let producer = s.spawn(move || produce(tx, until));
            let writer = s.spawn(|| record(rx, file, &self.path));

            let written = writer.join();
            // The producer stops on its own once the writer is gone.
            let produced = producer.join();
            match (written, produced) {
                (Ok(summary), Ok(_)) => summary,
                (Err(panic), _) | (_, Err(panic)) => std::panic::resume_unwind(panic),
            }
        })?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            "Wrote {} primes ({} bytes) to {}",
            summary.count,
            summary.bytes,
            self.path.display()
        );

        Ok(summary)
    }
}

/// Sends every prime in `2..until` over `tx`. Returns how many were sent.
fn produce(tx: Sender<u64>, until: u64) -> u64 {
    let mut sent = 0;
    for candidate in 2..until {
        #[cfg(feature = "tracing")]
        {
            if candidate % PROGRESS_INTERVAL == 0 {
                tracing::debug!("Scanned up to {candidate} ({sent} primes)");
            }
        }

        if is_prime(candidate) {
            if tx.send(candidate).is_err() {
                #[cfg(feature = "tracing")]
                tracing::debug!("Writer hung up, stopping scan at {candidate}");
                break;
            }
            sent += 1;
        }
    }
    // Dropping `tx` closes the handoff.
    sent
}

/// Appends every received prime to `file` until the producer hangs up.
fn record(rx: Receiver<u64>, file: File, path: &Path) -> Result<GenerateSummary> {
    let mut writer = BufWriter::new(file);
    let mut count = 0_u64;
    let mut largest = None;

    for prime in rx {
        let record = codec::encode(prime)?;
        writer
            .write_all(&record)
            .map_err(|e| Error::io(format!("writing {}", path.display()), e))?;
        count += 1;
        largest = Some(prime);
    }

    writer
        .into_inner()
        .map_err(|e| Error::io(format!("flushing {}", path.display()), e.into_error()))?
        .sync_all()
        .map_err(|e| Error::io(format!("syncing {}", path.display()), e))?;

    Ok(GenerateSummary {
        count,
        bytes: count * RECORD_SIZE as u64,
        largest,
    })
}

/// Reads a whole prime file into memory, in file order.
///
/// # Errors
///
/// Propagates any error from [`PrimeCacheReader`].
pub fn read_prime_file(path: impl AsRef<Path>) -> Result<Vec<u64>> {
    PrimeCacheReader::open(path, DEFAULT_BLOCK_SIZE)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIMES_BELOW_256: [u64; 54] = [
        2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83,
        89, 97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179,
        181, 191, 193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
    ];

    #[test]
    fn limit_eight_writes_primes_below_256() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.bin");

        let summary = PrimeFileGenerator::new(&path, 8).generate().unwrap();
        assert_eq!(summary.count, 54);
        assert_eq!(summary.bytes, 54 * 8);
        assert_eq!(summary.largest, Some(251));

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 54 * 8);
        assert_eq!(read_prime_file(&path).unwrap(), PRIMES_BELOW_256);
    }

    #[test]
    fn larger_limit_is_gap_free() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.bin");

        let summary = PrimeFileGenerator::new(&path, 16)
            .with_channel_capacity(0)
            .generate()
            .unwrap();
        // pi(65536) = 6542
        assert_eq!(summary.count, 6542);
        assert_eq!(summary.largest, Some(65_521));

        let primes = read_prime_file(&path).unwrap();
        let expected: Vec<u64> = (0..1 << 16).filter(|n| is_prime(*n)).collect();
        assert_eq!(primes, expected);
    }

    #[test]
    fn limit_one_writes_an_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.bin");

        let summary = PrimeFileGenerator::new(&path, 1).generate().unwrap();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.largest, None);
        assert!(matches!(
            read_prime_file(&path),
            Err(Error::EmptyPrimeFile { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_limits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("primes.bin");
        for limit in [0, MAX_LIMIT + 1, 64] {
            assert!(matches!(
                PrimeFileGenerator::new(&path, limit).generate(),
                Err(Error::InvalidLimit { .. })
            ));
        }
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("primes.bin");
        assert!(matches!(
            PrimeFileGenerator::new(path, 8).generate(),
            Err(Error::Io { .. })
        ));
    }

    #[test]
    fn max_limit_fits_the_record_format() {
        assert_eq!(MAX_LIMIT, 56);
        assert!(codec::encode((1 << MAX_LIMIT) - 1).is_ok());
    }
}
