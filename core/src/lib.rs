pub mod classifier;
pub mod config;
pub mod formats;
pub mod job;
pub mod observer;
pub mod output;
pub mod pipeline;
pub mod splitter;
pub mod translate;

#[cfg(test)]
mod testing;

pub use classifier::{is_color_code, should_ignore};
pub use config::{ConfigError, RunConfig};
pub use formats::properties::PropertiesAdapter;
pub use formats::yaml::{PathStep, YamlAdapter, YamlPath};
pub use formats::{DocumentAdapter, DocumentKind, FormatError, TranslationUnit};
pub use job::{BatchScheduler, CancelFlag, ScheduleOutcome};
pub use observer::{NullObserver, Reporter, RunObserver};
pub use output::{write_output, OutputError};
pub use pipeline::{Engine, PipelineError, RunOutcome, RunReport};
pub use splitter::{join, split, Token, TokenKind};
pub use translate::retry::RetryPolicy;
pub use translate::{
    ClientStats, LibreTranslateBackend, TranslationCache, TranslationClient, TranslationError,
    Translator,
};
