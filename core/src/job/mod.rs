//! Batch scheduling and cooperative cancellation for a translation run.

pub mod scheduler;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use scheduler::{BatchError, BatchScheduler, ScheduleOutcome};

/// Shared stop signal. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
