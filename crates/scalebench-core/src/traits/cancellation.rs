//! Cooperative sweep cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Something a sweep can poll between dimension-value transitions.
///
/// Cancellation never interrupts a call in flight; the orchestrator only
/// checks before starting the next point or pass.
pub trait Cancellable: Send + Sync {
    fn is_cancelled(&self) -> bool;

    fn cancel(&self);
}

/// Shared flag handed to a sweep; clones observe the same state, so a
/// signal handler or another thread can stop a running sweep.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cancellable for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}
