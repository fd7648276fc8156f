use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::CancelFlag;
use crate::config::RunConfig;
use crate::formats::TranslationUnit;
use crate::observer::Reporter;
use crate::translate::TranslationClient;

pub type Batch<A> = Vec<TranslationUnit<A>>;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("worker pool closed before the batch could start")]
    PoolClosed,
    #[error("batch worker panicked: {0}")]
    Panicked(String),
}

/// Merged results of one scheduling pass.
#[derive(Debug)]
pub struct ScheduleOutcome<A> {
    pub results: HashMap<A, String>,
    pub total_batches: usize,
    pub completed_batches: usize,
    pub failed_batches: usize,
    pub cancelled: bool,
}

impl<A> ScheduleOutcome<A> {
    fn empty(total_batches: usize) -> Self {
        Self {
            results: HashMap::new(),
            total_batches,
            completed_batches: 0,
            failed_batches: 0,
            cancelled: false,
        }
    }
}

/// Runs batches of units through a shared [`TranslationClient`] on the
/// blocking pool, at most `worker_count` at a time.
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    batch_size: usize,
    worker_count: usize,
    batch_delay: Duration,
}

impl BatchScheduler {
    pub fn new(batch_size: usize, worker_count: usize, batch_delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            worker_count: worker_count.max(1),
            batch_delay,
        }
    }

    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.batch_size, config.worker_count, config.batch_delay())
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Contiguous chunks of at most `batch_size` units, in input order.
    pub fn partition<A>(&self, units: Vec<TranslationUnit<A>>) -> Vec<Batch<A>> {
        let mut batches = Vec::with_capacity(units.len().div_ceil(self.batch_size));
        let mut current = Vec::with_capacity(self.batch_size);
        for unit in units {
            current.push(unit);
            if current.len() == self.batch_size {
                batches.push(std::mem::replace(
                    &mut current,
                    Vec::with_capacity(self.batch_size),
                ));
            }
        }
        if !current.is_empty() {
            batches.push(current);
        }
        batches
    }

    pub async fn run<A>(
        &self,
        units: Vec<TranslationUnit<A>>,
        client: Arc<TranslationClient>,
        cancel: &CancelFlag,
        reporter: &Reporter,
    ) -> ScheduleOutcome<A>
    where
        A: Eq + Hash + Send + 'static,
    {
        let batches = self.partition(units);
        let total = batches.len();
        let mut outcome = ScheduleOutcome::empty(total);

        if cancel.is_cancelled() {
            outcome.cancelled = true;
            return outcome;
        }

        let permits = Arc::new(Semaphore::new(self.worker_count));
        let mut tasks = JoinSet::new();
        for batch in batches {
            let permits = Arc::clone(&permits);
            let client = Arc::clone(&client);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| BatchError::PoolClosed)?;
                tokio::task::spawn_blocking(move || process_batch(batch, &client, &cancel))
                    .await
                    .map_err(|err| BatchError::Panicked(err.to_string()))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let batch_result = joined
                .map_err(|err| BatchError::Panicked(err.to_string()))
                .and_then(|result| result);
            match batch_result {
                Ok(results) => outcome.results.extend(results),
                Err(error) => {
                    outcome.failed_batches += 1;
                    reporter.warn(format!("Batch processing error: {error}"));
                }
            }

            outcome.completed_batches += 1;
            let done = outcome.completed_batches;
            reporter.progress(done, total);
            reporter.info(format!("Processed batch {done}/{total}"));

            if done < total && !cancel.is_cancelled() && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        outcome.cancelled = cancel.is_cancelled();
        outcome
    }
}

/// Translates one batch, stopping at the first unit that sees the flag set.
fn process_batch<A>(
    batch: Batch<A>,
    client: &TranslationClient,
    cancel: &CancelFlag,
) -> Vec<(A, String)> {
    let mut translated = Vec::with_capacity(batch.len());
    for unit in batch {
        if cancel.is_cancelled() {
            break;
        }
        let text = client.translate_fragment(&unit.text);
        translated.push((unit.address, text));
    }
    translated
}
