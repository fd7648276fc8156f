//! Run driver: read, extract, schedule, reassemble, write.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, RunConfig};
use crate::formats::properties::PropertiesAdapter;
use crate::formats::yaml::YamlAdapter;
use crate::formats::{DocumentAdapter, DocumentKind, FormatError};
use crate::job::{BatchScheduler, CancelFlag};
use crate::observer::{NullObserver, Reporter, RunObserver};
use crate::output::{write_output, OutputError};
use crate::translate::{ClientStats, TranslationCache, TranslationClient, TranslationError, Translator};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Language pair {from}->{to} not available")]
    UnsupportedLanguagePair { from: String, to: String },

    #[error("Failed to check language availability: {0}")]
    LanguageProbe(#[source] TranslationError),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("Runtime failure: {0}")]
    Runtime(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub document_kind: DocumentKind,
    pub units: usize,
    pub total_batches: usize,
    pub failed_batches: usize,
    pub cache_entries: usize,
    pub stats: ClientStats,
    /// `None` when the run was cancelled and nothing was written.
    pub output_path: Option<PathBuf>,
    pub backup_path: Option<PathBuf>,
}

impl RunReport {
    pub fn is_cancelled(&self) -> bool {
        self.outcome == RunOutcome::Cancelled
    }
}

/// One translation run over a single file.
pub struct Engine {
    config: RunConfig,
    translator: Box<dyn Translator>,
    observer: Arc<dyn RunObserver>,
    cancel: CancelFlag,
    cache: Arc<TranslationCache>,
}

impl Engine {
    pub fn new(config: RunConfig, translator: Box<dyn Translator>) -> Self {
        Self {
            config,
            translator,
            observer: Arc::new(NullObserver),
            cancel: CancelFlag::new(),
            cache: Arc::new(TranslationCache::new()),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reuses a cache across runs; by default every engine starts empty.
    pub fn with_cache(mut self, cache: Arc<TranslationCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub async fn translate_file(self) -> Result<RunReport, PipelineError> {
        let Engine {
            config,
            translator,
            observer,
            cancel,
            cache,
        } = self;

        config.validate()?;
        let reporter = Reporter::new(observer);
        let client = Arc::new(
            TranslationClient::new(translator, &config.source_lang, &config.target_lang)
                .with_cache(cache)
                .with_reporter(reporter.clone()),
        );

        let probe = Arc::clone(&client);
        let supported = tokio::task::spawn_blocking(move || probe.supports_language_pair())
            .await
            .map_err(|err| PipelineError::Runtime(err.to_string()))?
            .map_err(PipelineError::LanguageProbe)?;
        if !supported {
            return Err(PipelineError::UnsupportedLanguagePair {
                from: config.source_lang.clone(),
                to: config.target_lang.clone(),
            });
        }

        let kind = config.document_kind.resolve(&config.source_file);
        if config.document_kind == DocumentKind::Auto {
            reporter.info(format!("Auto-detected file type: {kind}"));
        }

        match kind {
            DocumentKind::Yaml => run_document(YamlAdapter::new(), &config, client, &cancel, &reporter).await,
            _ => run_document(PropertiesAdapter::new(), &config, client, &cancel, &reporter).await,
        }
    }

    /// Runs [`Engine::translate_file`] on a fresh multi-thread runtime.
    pub fn translate_file_blocking(self) -> Result<RunReport, PipelineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|err| PipelineError::Runtime(err.to_string()))?;
        runtime.block_on(self.translate_file())
    }
}

async fn run_document<D>(
    adapter: D,
    config: &RunConfig,
    client: Arc<TranslationClient>,
    cancel: &CancelFlag,
    reporter: &Reporter,
) -> Result<RunReport, PipelineError>
where
    D: DocumentAdapter,
{
    let kind = adapter.kind();
    let label = match kind {
        DocumentKind::Yaml => "YAML",
        _ => "properties",
    };
    reporter.info(format!("Reading {label} file: {}", config.source_file.display()));

    let content = fs::read_to_string(&config.source_file).map_err(|source| PipelineError::Read {
        path: config.source_file.clone(),
        source,
    })?;
    let mut document = adapter.parse(&content)?;
    let units = adapter.extract_units(&document);
    let unit_count = units.len();
    reporter.info(format!("Found {unit_count} translatable strings"));
    if unit_count == 0 {
        reporter.info("No translatable strings found");
    }

    let scheduler = BatchScheduler::from_config(config);
    let total_batches = unit_count.div_ceil(scheduler.batch_size());
    reporter.info(format!(
        "Processing {total_batches} batches with {} workers",
        scheduler.worker_count()
    ));

    let outcome = scheduler
        .run(units, Arc::clone(&client), cancel, reporter)
        .await;

    let mut report = RunReport {
        outcome: RunOutcome::Cancelled,
        document_kind: kind,
        units: unit_count,
        total_batches: outcome.total_batches,
        failed_batches: outcome.failed_batches,
        cache_entries: client.cache().len(),
        stats: client.stats(),
        output_path: None,
        backup_path: None,
    };

    if outcome.cancelled {
        reporter.info("Translation stopped by user");
        return Ok(report);
    }

    for path in adapter.apply_results(&mut document, &outcome.results) {
        reporter.warn(format!("Error setting value at path {path}: path not found"));
    }

    let rendered = adapter.render(&document)?;
    let backup_path = write_output(&config.output_file, &rendered, config.backup_existing)?;
    if let Some(backup) = &backup_path {
        reporter.info(format!("Previous output backed up to: {}", backup.display()));
    }
    reporter.info(format!(
        "Translation completed! Saved to: {}",
        config.output_file.display()
    ));
    reporter.info(format!("Cache entries: {}", report.cache_entries));

    report.outcome = RunOutcome::Completed;
    report.output_path = Some(config.output_file.clone());
    report.backup_path = backup_path;
    Ok(report)
}
