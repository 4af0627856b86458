use ferrofactor::{Error, FactorResult, Result};
use std::io::Write;
use tokio::sync::mpsc;

/// Destination for completed [`FactorResult`]s.
///
/// The collector calls [`accept`](ResultSink::accept) once per result, in
/// arrival order, and [`finish`](ResultSink::finish) once after the result
/// channel has closed. Any error stops collection and fails the run.
pub trait ResultSink: Send {
    fn accept(&mut self, result: &FactorResult) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Renders results as plain text:
///
/// ```text
/// 00042 (1.25µs): 84 factors to primes:
///     2
///     2
///     3
///     7
/// ```
///
/// Factor lines are indented with a single tab.
pub struct TextSink<W> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, result: &FactorResult) -> std::io::Result<()> {
        writeln!(
            self.out,
            "{:05} ({:?}): {} factors to primes:",
            result.id, result.elapsed, result.number
        )?;
        for factor in &result.factors {
            writeln!(self.out, "\t{factor}")?;
        }
        Ok(())
    }
}

impl<W: Write + Send> ResultSink for TextSink<W> {
    fn accept(&mut self, result: &FactorResult) -> Result<()> {
        self.render(result)
            .map_err(|e| Error::io(format!("writing result {}", result.id), e))
    }

    fn finish(&mut self) -> Result<()> {
        self.out
            .flush()
            .map_err(|e| Error::io("flushing results", e))
    }
}

impl ResultSink for Vec<FactorResult> {
    fn accept(&mut self, result: &FactorResult) -> Result<()> {
        self.push(result.clone());
        Ok(())
    }
}

/// Drains `rx` into `sink` until every sender has been dropped.
///
/// Blocks the calling thread, so run it on the blocking pool. Returns the sink
/// together with the number of results rendered.
///
/// # Errors
///
/// Returns the first error raised by the sink. The receiver is closed on the
/// way out so that producers see the failure instead of blocking.
pub fn collect<S: ResultSink>(mut rx: mpsc::Receiver<FactorResult>, mut sink: S) -> Result<(S, u64)> {
    let mut rendered = 0_u64;

    while let Some(result) = rx.blocking_recv() {
        if let Err(e) = sink.accept(&result) {
            #[cfg(feature = "tracing")]
            tracing::error!("Result sink failed after {rendered} results: {e}");
            rx.close();
            return Err(e);
        }
        rendered += 1;
    }

    sink.finish()?;
    #[cfg(feature = "tracing")]
    tracing::debug!("Result collector rendered {rendered} results");
    Ok((sink, rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    fn result(id: u64, number: u64, factors: &[u64]) -> FactorResult {
        FactorResult {
            id,
            elapsed: Duration::from_micros(3),
            number,
            factors: factors.to_vec(),
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn text_sink_renders_header_and_factor_lines() {
        let mut sink = TextSink::new(Vec::new());
        sink.accept(&result(42, 84, &[2, 2, 3, 7])).unwrap();
        sink.accept(&result(7, 1, &[1])).unwrap();
        sink.finish().unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "00042 (3µs): 84 factors to primes:\n\t2\n\t2\n\t3\n\t7\n\
             00007 (3µs): 1 factors to primes:\n\t1\n"
        );
    }

    #[test]
    fn collects_every_result_once_in_arrival_order() {
        let (tx, rx) = mpsc::channel(4);
        let producer = std::thread::spawn(move || {
            for id in [3, 1, 2, 0] {
                tx.blocking_send(result(id, 4, &[2, 2])).unwrap();
            }
        });

        let (sink, rendered) = collect(rx, Vec::new()).unwrap();
        producer.join().unwrap();

        assert_eq!(rendered, 4);
        let ids: Vec<_> = sink.iter().map(|r| r.id).collect();
        assert_eq!(ids, [3, 1, 2, 0]);
    }

    #[test]
    fn closed_channel_without_results_is_empty() {
        let (tx, rx) = mpsc::channel::<FactorResult>(1);
        drop(tx);
        let (sink, rendered) = collect(rx, Vec::new()).unwrap();
        assert_eq!(rendered, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn sink_error_is_fatal() {
        let (tx, rx) = mpsc::channel(2);
        tx.blocking_send(result(0, 2, &[2])).unwrap();
        drop(tx);

        let err = collect(rx, TextSink::new(FailingWriter)).err().unwrap();
        assert!(matches!(err, Error::Io { .. }));
    }
}
