use super::{DiskAssisted, Direct, Factorize};
use crate::{Error, Result};
use core::{fmt, str::FromStr};
use std::path::PathBuf;

/// Name of a factoring strategy, as given on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Direct,
    DiskAssisted,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Direct => write!(f, "direct"),
            Method::DiskAssisted => write!(f, "disk-assisted"),
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Accepts `direct` / `disk-assisted`, and the older `naive` / `disk`
    /// spellings.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "direct" | "naive" => Ok(Method::Direct),
            "disk-assisted" | "disk" => Ok(Method::DiskAssisted),
            other => Err(Error::UnknownMethod {
                name: other.to_string(),
            }),
        }
    }
}

/// A [`Method`] bound to everything it needs to run.
#[derive(Clone, Debug)]
pub enum Strategy {
    Direct(Direct),
    DiskAssisted(DiskAssisted),
}

impl Strategy {
    /// Builds the strategy for `method`. `primes` and `block_size` are only
    /// used by [`Method::DiskAssisted`].
    pub fn new(method: Method, primes: impl Into<PathBuf>, block_size: usize) -> Self {
        match method {
            Method::Direct => Strategy::Direct(Direct),
            Method::DiskAssisted => {
                Strategy::DiskAssisted(DiskAssisted::new(primes).with_block_size(block_size))
            }
        }
    }

    pub const fn method(&self) -> Method {
        match self {
            Strategy::Direct(_) => Method::Direct,
            Strategy::DiskAssisted(_) => Method::DiskAssisted,
        }
    }
}

impl Factorize for Strategy {
    fn factorize(&self, n: u64) -> Result<Vec<u64>> {
        match self {
            Strategy::Direct(direct) => direct.factorize(n),
            Strategy::DiskAssisted(disk) => disk.factorize(n),
        }
    }
}
