//! Run configuration: what to translate, where to write it and how hard to
//! push the translation engine.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::formats::DocumentKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Source file not found: {}", .0.display())]
    MissingSourceFile(PathBuf),

    #[error("Output file path is empty")]
    MissingOutputFile,

    #[error("Output path {} is not writable: {reason}", path.display())]
    UnwritableOutput { path: PathBuf, reason: String },

    #[error("{0} language code is empty")]
    MissingLanguage(&'static str),

    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,

    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    #[error("Batch delay must be a finite, non-negative number of seconds (got {0})")]
    InvalidDelay(f64),

    #[error("Config file I/O failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

fn default_source_lang() -> String {
    "en".to_string()
}

fn default_target_lang() -> String {
    "id".to_string()
}

fn default_worker_count() -> usize {
    2
}

fn default_batch_size() -> usize {
    5
}

fn default_batch_delay_secs() -> f64 {
    0.3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    #[serde(default)]
    pub source_file: PathBuf,

    #[serde(default)]
    pub output_file: PathBuf,

    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause after each completed batch, in seconds.
    #[serde(default = "default_batch_delay_secs")]
    pub batch_delay_secs: f64,

    #[serde(default)]
    pub document_kind: DocumentKind,

    /// Copy an existing output file to `<name>.bak.<timestamp>` before overwriting.
    #[serde(default)]
    pub backup_existing: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_file: PathBuf::new(),
            output_file: PathBuf::new(),
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            worker_count: default_worker_count(),
            batch_size: default_batch_size(),
            batch_delay_secs: default_batch_delay_secs(),
            document_kind: DocumentKind::default(),
            backup_existing: false,
        }
    }
}

impl RunConfig {
    pub fn new(source_file: impl Into<PathBuf>, output_file: impl Into<PathBuf>) -> Self {
        Self {
            source_file: source_file.into(),
            output_file: output_file.into(),
            ..Self::default()
        }
    }

    /// Checks everything that can be checked without the translation engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.source_file.is_file() {
            return Err(ConfigError::MissingSourceFile(self.source_file.clone()));
        }
        if self.output_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingOutputFile);
        }
        check_output_path(&self.output_file)?;
        if self.source_lang.trim().is_empty() {
            return Err(ConfigError::MissingLanguage("Source"));
        }
        if self.target_lang.trim().is_empty() {
            return Err(ConfigError::MissingLanguage("Target"));
        }
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        if !self.batch_delay_secs.is_finite() || self.batch_delay_secs < 0.0 {
            return Err(ConfigError::InvalidDelay(self.batch_delay_secs));
        }
        Ok(())
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.batch_delay_secs).unwrap_or(Duration::ZERO)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Rejects an output target that the final write could never produce: an
/// existing directory, a file standing where a parent directory should be, or
/// a directory that refuses new files. Nothing is created on the way.
fn check_output_path(target: &Path) -> Result<(), ConfigError> {
    let unwritable = |path: &Path, reason: String| ConfigError::UnwritableOutput {
        path: path.to_path_buf(),
        reason,
    };

    if target.is_dir() {
        return Err(unwritable(target, "target is a directory".into()));
    }

    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let Some(existing) = parent
        .ancestors()
        .map(|dir| if dir.as_os_str().is_empty() { Path::new(".") } else { dir })
        .find(|dir| dir.exists())
    else {
        return Ok(());
    };
    if !existing.is_dir() {
        return Err(unwritable(
            target,
            format!("{} exists and is not a directory", existing.display()),
        ));
    }

    let check = existing.join(format!(".mc-translate-check.{}", std::process::id()));
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&check)
        .and_then(|_| fs::remove_file(&check))
        .map_err(|err| unwritable(target, format!("cannot write to {}: {err}", existing.display())))
}
