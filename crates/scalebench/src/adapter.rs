//! Timing adapter seam between the orchestrator and user code.

use std::time::{Duration, Instant};

use scalebench_core::types::ArgValue;

use crate::alloc::AllocSnapshot;
use crate::operation::{Operation, OperationError};

/// What one adapter call reports for a batch of iterations.
#[derive(Debug, Clone)]
pub struct Measurement {
    /// Total elapsed time for the batch.
    pub elapsed: Duration,
    /// Total allocations for the batch. Negative values are a fault.
    pub allocations: i64,
    pub bytes_allocated: i64,
    /// Outcome of the last call made; a call not matching the operation's
    /// expectation ends the batch early.
    pub outcome: Result<(), OperationError>,
}

/// Invokes an operation and times it. The orchestrator never reads a
/// clock for samples itself; it only aggregates what adapters report.
pub trait TimingAdapter: Send + Sync {
    fn measure(&self, operation: &Operation, args: &[ArgValue], iterations: u64) -> Measurement;
}

/// Times batches with `Instant` and reads allocation counters from
/// [`CountingAllocator`](crate::alloc::CountingAllocator) when installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClockAdapter;

impl TimingAdapter for WallClockAdapter {
    fn measure(&self, operation: &Operation, args: &[ArgValue], iterations: u64) -> Measurement {
        let expectation = operation.expectation();
        let before = AllocSnapshot::capture();
        let start = Instant::now();

        let mut outcome = Ok(());
        for _ in 0..iterations {
            outcome = std::hint::black_box(operation.call(std::hint::black_box(args)));
            if !expectation.is_met_by(&outcome) {
                break;
            }
        }

        let elapsed = start.elapsed();
        let (allocations, bytes_allocated) = AllocSnapshot::capture().since(&before);
        Measurement {
            elapsed,
            allocations,
            bytes_allocated,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn runs_requested_iterations() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let op = Operation::new("count", move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        let m = WallClockAdapter.measure(&op, &[], 25);
        assert_eq!(calls.load(Ordering::Relaxed), 25);
        assert!(m.outcome.is_ok());
    }

    #[test]
    fn stops_at_first_unexpected_error() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let op = Operation::new("fail", move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
            Err(OperationError::new("nope"))
        });
        let m = WallClockAdapter.measure(&op, &[], 10);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(m.outcome, Err(OperationError::new("nope")));
    }

    #[test]
    fn expected_errors_run_the_whole_batch() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        let op = Operation::new("reject", move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
            Err(OperationError::new("rejected"))
        })
        .expect_error();
        let m = WallClockAdapter.measure(&op, &[], 10);
        assert_eq!(calls.load(Ordering::Relaxed), 10);
        assert!(m.outcome.is_err());
    }
}
