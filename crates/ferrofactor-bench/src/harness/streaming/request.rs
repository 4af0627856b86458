use ferrofactor::Request;

/// A message sent from the request generator to the dispatcher.
///
/// The generator never closes its stream implicitly: once it observes
/// cancellation it sends [`WorkRequest::EndOfStream`] and stops. A closed
/// channel without a sentinel means the generator went away unexpectedly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkRequest {
    /// Factor `Request::number`.
    Factor(Request),

    /// No further requests will follow.
    ///
    /// - `issued`: Number of requests handed to the channel before this one.
    EndOfStream { issued: u64 },
}
