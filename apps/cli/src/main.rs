use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use mc_translator_core::{
    DocumentKind, Engine, LibreTranslateBackend, RunConfig, RunObserver, RunOutcome,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliKind {
    Auto,
    Properties,
    Yaml,
}

impl From<CliKind> for DocumentKind {
    fn from(kind: CliKind) -> Self {
        match kind {
            CliKind::Auto => DocumentKind::Auto,
            CliKind::Properties => DocumentKind::Properties,
            CliKind::Yaml => DocumentKind::Yaml,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "mc-translate", version)]
#[command(about = "Translate Minecraft .properties and YAML language files")]
struct Cli {
    /// File to translate (.properties, .lang, .yml, .yaml)
    #[arg(value_name = "SOURCE")]
    source: Option<PathBuf>,

    /// Where the translated file is written
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short = 'f', long = "from", value_name = "LANG")]
    source_lang: Option<String>,

    #[arg(short = 't', long = "to", value_name = "LANG")]
    target_lang: Option<String>,

    /// Concurrent batch workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Units per batch
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Pause after each finished batch, in seconds
    #[arg(short, long)]
    delay: Option<f64>,

    #[arg(short, long, value_enum)]
    kind: Option<CliKind>,

    /// Load settings from a JSON file; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the effective settings to a JSON file before running
    #[arg(long, value_name = "PATH")]
    save_config: Option<PathBuf>,

    /// Keep a timestamped copy of an existing output file
    #[arg(long)]
    backup: bool,

    /// LibreTranslate server
    #[arg(long, env = "LIBRETRANSLATE_URL", default_value = "http://127.0.0.1:5000")]
    server: String,

    #[arg(long, env = "LIBRETRANSLATE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Print the languages the server offers and exit
    #[arg(long)]
    list_languages: bool,
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(source) = &self.source {
            config.source_file = source.clone();
        }
        if let Some(output) = &self.output {
            config.output_file = output.clone();
        }
        if let Some(lang) = &self.source_lang {
            config.source_lang = lang.clone();
        }
        if let Some(lang) = &self.target_lang {
            config.target_lang = lang.clone();
        }
        if let Some(workers) = self.workers {
            config.worker_count = workers;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(delay) = self.delay {
            config.batch_delay_secs = delay;
        }
        if let Some(kind) = self.kind {
            config.document_kind = kind.into();
        }
        if self.backup {
            config.backup_existing = true;
        }
        Ok(config)
    }
}

/// Renders batch progress on stderr; messages already go through the logger.
struct ConsoleProgress;

impl RunObserver for ConsoleProgress {
    fn progress(&self, done: usize, total: usize) {
        let percent = if total == 0 { 100 } else { done * 100 / total };
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r[{done}/{total}] {percent:>3}%");
        if done == total {
            let _ = writeln!(stderr);
        }
        let _ = stderr.flush();
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // The blocking HTTP client must be built outside the async runtime.
    let mut backend = LibreTranslateBackend::new(cli.server.clone())
        .context("Failed to create translation client")?
        .with_api_key(cli.api_key.clone());

    if cli.list_languages {
        for language in backend.languages().context("Failed to fetch languages")? {
            println!("{:<8} {}", language.code, language.name);
        }
        return Ok(());
    }

    let config = cli.run_config()?;
    if let Some(path) = &cli.save_config {
        config
            .save(path)
            .with_context(|| format!("Failed to save settings to {}", path.display()))?;
        info!("Settings saved to {}", path.display());
    }
    if config.source_file.as_os_str().is_empty() {
        bail!("Please select a source file");
    }

    info!(
        "Starting translation {} -> {} with {} workers",
        config.source_lang, config.target_lang, config.worker_count
    );

    let engine = Engine::new(config, Box::new(backend)).with_observer(Arc::new(ConsoleProgress));
    let cancel = engine.cancel_flag();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let report = runtime.block_on(async move {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Translation stop requested...");
                cancel.cancel();
            }
        });
        engine.translate_file().await
    });

    let report = report.context("Translation failed")?;
    match report.outcome {
        RunOutcome::Completed => info!(
            "{} strings in {} batches ({} failed), {} translator calls, {} cache hits",
            report.units,
            report.total_batches,
            report.failed_batches,
            report.stats.backend_calls,
            report.stats.cache_hits
        ),
        RunOutcome::Cancelled => std::process::exit(130),
    }
    Ok(())
}
