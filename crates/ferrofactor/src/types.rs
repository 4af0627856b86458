use core::time::Duration;

/// A number to factor, tagged with the order in which it was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    pub id: u64,
    pub number: u64,
}

/// The outcome of factoring a single [`Request`].
///
/// `factors` is never empty, is sorted ascending and multiplies back to
/// `number`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FactorResult {
    pub id: u64,
    pub elapsed: Duration,
    pub number: u64,
    pub factors: Vec<u64>,
}
