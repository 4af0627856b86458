//! Semaphore-bounded dispatch of factoring units.
//!
//! The [`WorkerPool`] pulls [`WorkRequest`]s off the generator's channel and
//! starts one unit per request on Tokio's blocking pool. A unit may only start
//! once it holds a permit from a semaphore sized to the pool's concurrency, and
//! the permit moves into the unit so it is returned exactly once, however the
//! unit ends.
//!
//! Units are never cancelled. When the request stream ends (or a unit fails)
//! the pool stops dispatching and waits for every started unit to finish.

use super::{
    stats::{PoolSnapshot, PoolStats},
    worker::factor_unit,
};
use crate::harness::streaming::request::WorkRequest;
use ferrofactor::{Error, FactorResult, Factorize, Result};
use std::sync::Arc;
use tokio::{
    sync::{Semaphore, mpsc},
    task::{JoinError, JoinSet},
};
use tokio_util::sync::CancellationToken;

pub struct WorkerPool<F> {
    factorizer: Arc<F>,
    capacity: Arc<Semaphore>,
    concurrency: usize,
    stats: Arc<PoolStats>,
    results: mpsc::Sender<FactorResult>,
}

impl<F> WorkerPool<F>
where
    F: Factorize + 'static,
{
    /// Creates a pool that runs at most `concurrency` units at once and sends
    /// their results to `results`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConcurrency`] if `concurrency` is zero.
    pub fn new(
        factorizer: F,
        concurrency: usize,
        results: mpsc::Sender<FactorResult>,
    ) -> Result<Self> {
        if concurrency == 0 {
            return Err(Error::InvalidConcurrency);
        }
        Ok(Self {
            factorizer: Arc::new(factorizer),
            capacity: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            stats: Arc::new(PoolStats::default()),
            results,
        })
    }

    pub const fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Shared counters, readable while [`dispatch`](Self::dispatch) runs.
    pub fn stats(&self) -> Arc<PoolStats> {
        Arc::clone(&self.stats)
    }

    /// Dispatches requests from `rx` until the stream ends, then waits for
    /// every started unit.
    ///
    /// The pool's result sender is dropped on return, so the result channel
    /// closes once the last unit has delivered.
    ///
    /// # Errors
    ///
    /// The first unit failure stops dispatch: `token` is cancelled, `rx` is
    /// closed, in-flight units are drained and the failure is returned. A
    /// panicking unit is reported as [`Error::WorkerPanicked`].
    pub async fn dispatch(
        self,
        mut rx: mpsc::Receiver<WorkRequest>,
        token: CancellationToken,
    ) -> Result<PoolSnapshot> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Dispatching with concurrency {}", self.concurrency);

        let mut units = JoinSet::new();
        let mut failure = None;

        while let Some(work) = rx.recv().await {
            let request = match work {
                WorkRequest::Factor(request) => request,
                WorkRequest::EndOfStream { issued: _issued } => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Request stream ended after {_issued} requests");
                    break;
                }
            };

            let permit = match Arc::clone(&self.capacity).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    failure = Some(Error::ChannelError {
                        context: "Capacity semaphore closed".to_string(),
                    });
                    break;
                }
            };

            // A freed permit may belong to a unit that failed.
            while let Some(joined) = units.try_join_next() {
                if let Err(e) = unit_outcome(joined) {
                    failure = Some(e);
                    break;
                }
            }
            if failure.is_some() {
                break;
            }

            self.stats.dispatched();
            let factorizer = Arc::clone(&self.factorizer);
            let results = self.results.clone();
            let stats = Arc::clone(&self.stats);
            units.spawn_blocking(move || {
                let _permit = permit;
                let _guard = stats.enter();
                factor_unit(factorizer.as_ref(), request, &results)
            });
        }

        if let Some(_e) = &failure {
            #[cfg(feature = "tracing")]
            tracing::error!("Factoring unit failed, stopping dispatch: {_e}");
            token.cancel();
            rx.close();
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("Waiting for {} in-flight units", units.len());
        while let Some(joined) = units.join_next().await {
            if let Err(e) = unit_outcome(joined) {
                if failure.is_none() {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Factoring unit failed while draining: {e}");
                    token.cancel();
                    rx.close();
                }
                failure.get_or_insert(e);
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(self.stats.snapshot()),
        }
    }
}

fn unit_outcome(joined: Result<Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(outcome) => outcome,
        Err(e) => Err(Error::WorkerPanicked {
            reason: e.to_string(),
        }),
    }
}
