use portable_atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Live counters for a [`WorkerPool`](super::manager::WorkerPool).
///
/// `in_flight` only moves while a unit holds its capacity permit, so
/// `peak_in_flight` never exceeds the pool's concurrency.
#[derive(Debug, Default)]
pub struct PoolStats {
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    dispatched: AtomicU64,
    completed: AtomicU64,
}

/// Point-in-time copy of [`PoolStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolSnapshot {
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub dispatched: u64,
    pub completed: u64,
}

impl PoolStats {
    pub fn dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Marks a unit as running until the returned guard is dropped.
    pub fn enter(self: &Arc<Self>) -> InFlightGuard {
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
        InFlightGuard {
            stats: Arc::clone(self),
        }
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            in_flight: self.in_flight.load(Ordering::Acquire),
            peak_in_flight: self.peak_in_flight.load(Ordering::Acquire),
            dispatched: self.dispatched.load(Ordering::Acquire),
            completed: self.completed.load(Ordering::Acquire),
        }
    }
}

/// Ends a unit's in-flight window on drop, including during a panic unwind.
#[must_use]
pub struct InFlightGuard {
    stats: Arc<PoolStats>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::AcqRel);
        self.stats.completed.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guards_track_in_flight_and_peak() {
        let stats = Arc::new(PoolStats::default());
        stats.dispatched();
        stats.dispatched();

        let first = stats.enter();
        let second = stats.enter();
        assert_eq!(stats.snapshot().in_flight, 2);
        drop(first);
        drop(second);

        let third = stats.enter();
        drop(third);

        assert_eq!(
            stats.snapshot(),
            PoolSnapshot {
                in_flight: 0,
                peak_in_flight: 2,
                dispatched: 2,
                completed: 3,
            }
        );
    }

    #[test]
    fn guard_is_released_on_panic() {
        let stats = Arc::new(PoolStats::default());
        let unit = Arc::clone(&stats);
        let outcome = std::thread::spawn(move || {
            let _guard = unit.enter();
            panic!("unit failed");
        })
        .join();

        assert!(outcome.is_err());
        assert_eq!(stats.snapshot().in_flight, 0);
        assert_eq!(stats.snapshot().completed, 1);
    }
}
