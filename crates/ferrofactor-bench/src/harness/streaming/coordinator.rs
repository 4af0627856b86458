use super::{
    collector::{ResultSink, collect},
    generator::RequestGenerator,
};
use crate::harness::{
    config::{BenchConfig, GenerateConfig},
    pool::manager::WorkerPool,
};
use core::time::Duration;
use ferrofactor::{Error, GenerateSummary, Method, RandSource, Result};
use std::time::Instant;
use tokio::{sync::mpsc, task::JoinError};
use tokio_util::sync::CancellationToken;

/// Outcome of a completed factoring run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub method: Method,
    /// Requests handed to the dispatcher before the deadline.
    pub issued: u64,
    /// Units started by the pool.
    pub dispatched: u64,
    /// Units that ran to completion.
    pub completed: u64,
    /// Results written by the sink.
    pub rendered: u64,
    pub peak_in_flight: usize,
    pub concurrency: usize,
    pub elapsed: Duration,
}

/// Returns a child of `parent` that is cancelled after `timeout`, or earlier
/// if `parent` is.
fn deadline(parent: &CancellationToken, timeout: Duration) -> CancellationToken {
    let token = parent.child_token();
    let timer = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = tokio::time::sleep(timeout) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Deadline of {timeout:?} reached");
                timer.cancel();
            }
            () = timer.cancelled() => {}
        }
    });
    token
}

fn joined<T>(task: &str, outcome: Result<T, JoinError>) -> Result<T> {
    outcome.map_err(|e| Error::WorkerPanicked {
        reason: format!("{task} task failed: {e}"),
    })
}

/// Factors random numbers until `config.timeout` elapses or `shutdown` is
/// cancelled, writing each result to `sink`.
///
/// The generator stops issuing requests at the deadline. Every request issued
/// before then is factored and rendered before this returns.
///
/// # Errors
///
/// - [`Error::InvalidResultBufferSize`], [`Error::InvalidShift`] or
///   [`Error::InvalidConcurrency`] if `config` is out of range. Nothing is
///   spawned in that case.
/// - Otherwise fails fast on the first factoring, channel or sink error.
///   Dispatch errors take precedence over errors seen afterwards by the
///   collector.
pub async fn run_benchmark<R, S>(
    config: BenchConfig,
    rand: R,
    sink: S,
    shutdown: CancellationToken,
) -> Result<(RunSummary, S)>
where
    R: RandSource + Send + 'static,
    S: ResultSink + 'static,
{
    if config.result_buffer_size == 0 {
        return Err(Error::InvalidResultBufferSize);
    }

    let method = config.strategy.method();
    let generator = RequestGenerator::new(rand, config.shift)?;

    // Capacity 1 keeps at most one request buffered past the deadline.
    let (request_tx, request_rx) = mpsc::channel(1);
    let (result_tx, result_rx) = mpsc::channel(config.result_buffer_size);

    let pool = WorkerPool::new(config.strategy, config.concurrency, result_tx)?;
    let concurrency = pool.concurrency();

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Factoring with {method} for {:?} (shift = {}, concurrency = {concurrency})",
        config.timeout,
        config.shift,
    );

    let start = Instant::now();
    let token = deadline(&shutdown, config.timeout);

    let collector = tokio::task::spawn_blocking(move || collect(result_rx, sink));
    let generator = tokio::spawn(generator.run(request_tx, token.clone()));

    let dispatched = pool.dispatch(request_rx, token.clone()).await;
    // Stops the deadline timer and, on failure, the generator.
    token.cancel();

    let issued = joined("generator", generator.await);
    let collected = joined("collector", collector.await).and_then(|outcome| outcome);
    let elapsed = start.elapsed();

    let snapshot = dispatched?;
    let issued = issued?;
    let (sink, rendered) = collected?;

    let summary = RunSummary {
        method,
        issued,
        dispatched: snapshot.dispatched,
        completed: snapshot.completed,
        rendered,
        peak_in_flight: snapshot.peak_in_flight,
        concurrency,
        elapsed,
    };

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Factored {} numbers with {} in {:?} (peak {} of {} in flight)",
        summary.completed,
        summary.method,
        summary.elapsed,
        summary.peak_in_flight,
        summary.concurrency,
    );

    Ok((summary, sink))
}

/// Writes a prime file on the blocking pool.
///
/// # Errors
///
/// Propagates any error from [`ferrofactor::PrimeFileGenerator::generate`].
pub async fn generate_prime_file(config: GenerateConfig) -> Result<GenerateSummary> {
    let generator = config.generator();
    #[cfg(feature = "tracing")]
    tracing::info!(
        "Writing primes below 2^{} to {}",
        generator.limit(),
        generator.path().display()
    );

    #[cfg(feature = "tracing")]
    let start = Instant::now();
    let summary = joined(
        "prime generator",
        tokio::task::spawn_blocking(move || generator.generate()).await,
    )??;

    #[cfg(feature = "tracing")]
    tracing::info!(
        "Wrote {} primes ({} bytes, largest {:?}) in {:?}",
        summary.count,
        summary.bytes,
        summary.largest,
        start.elapsed()
    );
    Ok(summary)
}
