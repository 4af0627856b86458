#![doc = include_str!("../README.md")]

pub mod cache;
pub mod codec;
mod error;
pub mod factor;
pub mod primes;
mod rand;
mod types;

pub use crate::cache::{DEFAULT_BLOCK_SIZE, PrimeCacheReader};
pub use crate::error::*;
pub use crate::factor::{CACHE_THRESHOLD, DiskAssisted, Direct, Factorize, Method, Strategy};
pub use crate::primes::{GenerateSummary, PrimeFileGenerator, read_prime_file};
pub use crate::rand::*;
pub use crate::types::*;
