use super::{Factorize, trial_divide};
use crate::{DEFAULT_BLOCK_SIZE, PrimeCacheReader, Result};
use std::path::{Path, PathBuf};

/// Candidates below this bound are tried directly; the prime file is only
/// consulted for larger ones.
pub const CACHE_THRESHOLD: u64 = 1 << 16;

/// Trial division that draws candidates above [`CACHE_THRESHOLD`] from a prime
/// file.
///
/// Each call to [`Factorize::factorize`] that gets past the threshold opens its
/// own [`PrimeCacheReader`], so nothing is shared between concurrent callers.
/// If the file runs out before `sqrt(n)` is reached, the search continues over
/// consecutive integers.
#[derive(Clone, Debug)]
pub struct DiskAssisted {
    path: PathBuf,
    block_size: usize,
}

impl DiskAssisted {
    /// Uses the prime file at `path` with the default block size.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Overrides the block size used by each reader.
    #[must_use]
    pub const fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Factorize for DiskAssisted {
    fn factorize(&self, n: u64) -> Result<Vec<u64>> {
        if n < 2 {
            return Ok(vec![n]);
        }

        let mut factors = Vec::new();
        let mut rest = n;

        let next = trial_divide(&mut rest, 2, CACHE_THRESHOLD, &mut factors);
        if next > rest / next {
            factors.push(rest);
            return Ok(factors);
        }

        let mut reader = PrimeCacheReader::open(&self.path, self.block_size)?;
        let mut resume = CACHE_THRESHOLD;
        while let Some(prime) = reader.next_prime()? {
            if prime < CACHE_THRESHOLD {
                continue;
            }
            while prime <= rest / prime && rest % prime == 0 {
                factors.push(prime);
                rest /= prime;
            }
            if prime > rest / prime {
                factors.push(rest);
                return Ok(factors);
            }
            resume = prime + 1;
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            "Prime cache {} exhausted at {resume}, continuing directly",
            self.path.display()
        );

        trial_divide(&mut rest, resume, u64::MAX, &mut factors);
        factors.push(rest);
        Ok(factors)
    }
}
