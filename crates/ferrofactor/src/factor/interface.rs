use crate::Result;

/// A prime factorization strategy.
///
/// Implementations must be shareable across worker threads: the benchmark
/// harness hands a single instance to every factoring unit.
///
/// # Example
///
/// ```
/// use ferrofactor::{Direct, Factorize};
///
/// assert_eq!(Direct.factorize(360).unwrap(), vec![2, 2, 2, 3, 3, 5]);
/// ```
pub trait Factorize: Send + Sync {
    /// Returns the prime factors of `n` in ascending order with multiplicity.
    ///
    /// # Errors
    ///
    /// Strategies backed by external resources (such as a prime file) may fail
    /// with an I/O or decoding error. Pure strategies never fail.
    fn factorize(&self, n: u64) -> Result<Vec<u64>>;
}

impl<F> Factorize for std::sync::Arc<F>
where
    F: Factorize + ?Sized,
{
    fn factorize(&self, n: u64) -> Result<Vec<u64>> {
        (**self).factorize(n)
    }
}
