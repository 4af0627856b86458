//! Sequential, block-buffered access to a prime file.
//!
//! A [`PrimeCacheReader`] walks a prime file front to back exactly once. Records
//! are pulled from disk one block at a time to amortize I/O and decoded on
//! demand. Readers are cheap to open and are never shared: every disk-assisted
//! factorization opens its own over the same path.

use crate::{
    Error, Result,
    codec::{self, RECORD_SIZE},
};
use std::{
    fs::File,
    io::{ErrorKind, Read},
    path::{Path, PathBuf},
};

/// Default block size used when refilling from disk (1 MiB).
pub const DEFAULT_BLOCK_SIZE: usize = 1024 * 1024;

/// In-memory working set for a single reader.
#[derive(Debug)]
struct CacheBlock {
    buffer: Vec<u8>,
    filled: usize,
    offset: usize,
}

impl CacheBlock {
    fn new(size: usize) -> Self {
        Self {
            buffer: vec![0_u8; size],
            filled: 0,
            offset: 0,
        }
    }

    const fn is_exhausted(&self) -> bool {
        self.offset >= self.filled
    }

    fn next_record(&mut self) -> &[u8] {
        let record = &self.buffer[self.offset..self.offset + RECORD_SIZE];
        self.offset += RECORD_SIZE;
        record
    }
}

/// Forward-only reader over the ascending primes stored in a prime file.
///
/// # Example
///
/// ```no_run
/// use ferrofactor::{DEFAULT_BLOCK_SIZE, PrimeCacheReader};
///
/// let mut reader = PrimeCacheReader::open("primes.bin", DEFAULT_BLOCK_SIZE)?;
/// while let Some(prime) = reader.next_prime()? {
///     println!("{prime}");
/// }
/// # Ok::<(), ferrofactor::Error>(())
/// ```
#[derive(Debug)]
pub struct PrimeCacheReader {
    path: PathBuf,
    // `None` once end-of-file has been observed and the handle closed.
    file: Option<File>,
    block: CacheBlock,
}

impl PrimeCacheReader {
    /// Opens `path` and eagerly fills the first block.
    ///
    /// Files shorter than one block are accepted; the first block then holds
    /// the whole file.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBlockSize`] if `block_size` is zero or not a multiple
    ///   of the record size.
    /// - [`Error::Io`] if the file cannot be opened or read.
    /// - [`Error::EmptyPrimeFile`] if the file holds no records.
    /// - [`Error::TruncatedRecord`] if the file ends mid-record.
    pub fn open(path: impl AsRef<Path>, block_size: usize) -> Result<Self> {
        if block_size == 0 || block_size % RECORD_SIZE != 0 {
            return Err(Error::InvalidBlockSize { size: block_size });
        }

        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)
            .map_err(|e| Error::io(format!("opening {}", path.display()), e))?;

        let mut reader = Self {
            path,
            file: Some(file),
            block: CacheBlock::new(block_size),
        };

        if !reader.refill()? {
            return Err(Error::EmptyPrimeFile { path: reader.path });
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            "Opened prime cache {} ({} bytes in first block)",
            reader.path.display(),
            reader.block.filled
        );

        Ok(reader)
    }

    /// Returns the path this reader was opened on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the next prime, or `Ok(None)` once the file is exhausted.
    ///
    /// The underlying file handle is closed as soon as end-of-file is reached;
    /// further calls keep returning `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if a refill fails or a record cannot be decoded.
    pub fn next_prime(&mut self) -> Result<Option<u64>> {
        if self.block.is_exhausted() && !self.refill()? {
            return Ok(None);
        }
        codec::decode(self.block.next_record()).map(Some)
    }

    /// Reads the next block from disk. Returns `false` at end-of-file.
    fn refill(&mut self) -> Result<bool> {
        let Some(file) = self.file.as_mut() else {
            return Ok(false);
        };

        let buffer = &mut self.block.buffer;
        let mut filled = 0;
        while filled < buffer.len() {
            match file.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(Error::io(format!("reading {}", self.path.display()), e));
                }
            }
        }

        if filled == 0 {
            // Dropping the handle closes the file.
            self.file = None;
            self.block.filled = 0;
            self.block.offset = 0;
            return Ok(false);
        }

        if filled % RECORD_SIZE != 0 {
            return Err(Error::TruncatedRecord { len: filled });
        }

        self.block.filled = filled;
        self.block.offset = 0;
        Ok(true)
    }
}

impl Iterator for PrimeCacheReader {
    type Item = Result<u64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_prime().transpose()
    }
}
