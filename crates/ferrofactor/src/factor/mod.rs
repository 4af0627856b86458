//! Prime factorization by trial division.
//!
//! Two interchangeable strategies are provided:
//!
//! - [`Direct`]: scans every integer candidate from 2 up to the square root of
//!   the remaining cofactor.
//! - [`DiskAssisted`]: scans integers below [`CACHE_THRESHOLD`], then switches
//!   to the ascending primes stored in a prime file so composite candidates are
//!   skipped.
//!
//! Both return the prime factors in ascending order with multiplicity. `0` and
//! `1` have no prime factorization; they are returned unchanged as a single
//! element so that every result is non-empty and multiplies back to its input.
//!
//! The strategy is picked once per run via [`Method`] and bound to its
//! parameters in a [`Strategy`].

mod direct;
mod disk;
mod interface;
mod method;

pub use direct::*;
pub use disk::*;
pub use interface::*;
pub use method::*;


/// Returns `true` if `n` is prime, by trial division up to `sqrt(n)`.
pub const fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d <= n / d {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// Divides every factor `d` with `from <= d < until` and `d * d <= rest` out of
/// `rest`, appending each hit to `factors`.
///
/// Returns the next untested candidate. When the scan stops because
/// `d * d > rest`, the returned candidate proves `rest` has no factor below its
/// square root.
fn trial_divide(rest: &mut u64, from: u64, until: u64, factors: &mut Vec<u64>) -> u64 {
    let mut d = from;
    while d < until && d <= *rest / d {
        if *rest % d == 0 {
            factors.push(d);
            *rest /= d;
        } else {
            d += 1;
        }
    }
    d
}
