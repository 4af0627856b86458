use super::{Factorize, trial_divide};
use crate::Result;

/// Plain trial division over consecutive integers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Direct;

impl Direct {
    /// Infallible form of [`Factorize::factorize`].
    pub fn factors(n: u64) -> Vec<u64> {
        if n < 2 {
            return vec![n];
        }

        let mut factors = Vec::new();
        let mut rest = n;
        trial_divide(&mut rest, 2, u64::MAX, &mut factors);
        // Whatever survives has no divisor below its square root.
        factors.push(rest);
        factors
    }
}

impl Factorize for Direct {
    fn factorize(&self, n: u64) -> Result<Vec<u64>> {
        Ok(Self::factors(n))
    }
}
