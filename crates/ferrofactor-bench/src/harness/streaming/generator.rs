use super::request::WorkRequest;
use ferrofactor::{Error, RandSource, Request, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Produces an unbounded stream of [`Request`]s with random operands.
///
/// Each operand is `rand() >> shift`, so larger shifts yield smaller (and
/// cheaper) numbers. Request ids start at 0 and increase by one per request
/// handed to the dispatcher.
pub struct RequestGenerator<R> {
    rand: R,
    shift: u32,
    next_id: u64,
}

impl<R: RandSource> RequestGenerator<R> {
    /// # Errors
    ///
    /// Returns [`Error::InvalidShift`] if `shift` is above 63.
    pub fn new(rand: R, shift: u32) -> Result<Self> {
        if shift > 63 {
            return Err(Error::InvalidShift { shift });
        }
        Ok(Self {
            rand,
            shift,
            next_id: 0,
        })
    }

    /// Builds the next request without consuming its id.
    fn draw(&mut self) -> Request {
        Request {
            id: self.next_id,
            number: self.rand.rand() >> self.shift,
        }
    }

    /// Sends requests over `tx` until `token` is cancelled, then sends
    /// [`WorkRequest::EndOfStream`] and returns the number of requests issued.
    ///
    /// Every send races the cancellation token with cancellation checked
    /// first, so no request is handed off once cancellation has been observed.
    /// A request whose send already completed stays in the channel and will be
    /// delivered.
    ///
    /// If the dispatcher hangs up early the generator stops without a
    /// sentinel.
    pub async fn run(mut self, tx: mpsc::Sender<WorkRequest>, token: CancellationToken) -> u64 {
        #[cfg(feature = "tracing")]
        tracing::debug!("Request generator started (shift = {})", self.shift);

        while !token.is_cancelled() {
            let request = self.draw();
            tokio::select! {
                biased;
                () = token.cancelled() => break,
                sent = tx.send(WorkRequest::Factor(request)) => {
                    if sent.is_err() {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("Dispatcher hung up after {} requests", self.next_id);
                        return self.next_id;
                    }
                    self.next_id += 1;
                }
            }
        }

        let issued = self.next_id;
        #[cfg(feature = "tracing")]
        tracing::debug!("Request generator cancelled after {issued} requests");
        if tx.send(WorkRequest::EndOfStream { issued }).await.is_err() {
            #[cfg(feature = "tracing")]
            tracing::debug!("Dispatcher gone before end of stream");
        }
        issued
    }
}
