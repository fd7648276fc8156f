use std::sync::Arc;

use log::{debug, info, warn};

/// Callbacks a front-end receives while a run is in flight.
pub trait RunObserver: Send + Sync {
    fn log(&self, _message: &str) {}

    /// Called once per finished batch with `(batches_completed, total_batches)`.
    fn progress(&self, _done: usize, _total: usize) {}
}

/// Observer that discards everything; messages still reach the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RunObserver for NullObserver {}

/// Fans run messages out to the `log` facade and to the attached observer.
#[derive(Clone)]
pub struct Reporter {
    observer: Arc<dyn RunObserver>,
}

impl Reporter {
    pub fn new(observer: Arc<dyn RunObserver>) -> Self {
        Self { observer }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!("{message}");
        self.observer.log(message);
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        warn!("{message}");
        self.observer.log(message);
    }

    pub fn progress(&self, done: usize, total: usize) {
        debug!("progress {done}/{total}");
        self.observer.progress(done, total);
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(Arc::new(NullObserver))
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}
