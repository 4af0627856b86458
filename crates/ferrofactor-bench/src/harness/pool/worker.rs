use ferrofactor::{Error, FactorResult, Factorize, Request, Result};
use std::time::Instant;
use tokio::sync::mpsc;

/// Factors one request and hands the result to the collector.
///
/// Runs on a blocking thread. Only the factorization itself is timed; waiting
/// for room in the result channel is not.
///
/// # Errors
///
/// - Any error raised by `factorizer`.
/// - [`Error::ChannelError`] if the collector has gone away.
pub fn factor_unit<F>(
    factorizer: &F,
    request: Request,
    results: &mpsc::Sender<FactorResult>,
) -> Result<()>
where
    F: Factorize + ?Sized,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Factoring request {} ({})", request.id, request.number);

    let start = Instant::now();
    let factors = factorizer.factorize(request.number)?;
    let elapsed = start.elapsed();

    results
        .blocking_send(FactorResult {
            id: request.id,
            elapsed,
            number: request.number,
            factors,
        })
        .map_err(|_| Error::ChannelError {
            context: format!("Result collector closed before request {}", request.id),
        })
}
