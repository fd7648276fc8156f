//! Translation capability and the shared, cached client wrapped around it.

pub mod cache;
pub mod client;
pub mod libre;
pub mod retry;

use thiserror::Error;

pub use cache::TranslationCache;
pub use client::{ClientStats, TranslationClient};
pub use libre::LibreTranslateBackend;

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation server returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("translation request failed: {0}")]
    Network(String),
    #[error("unexpected translation response: {0}")]
    InvalidResponse(String),
    #[error("translator reported an error: {0}")]
    Failure(String),
}

/// An opaque machine-translation engine.
///
/// Implementations are not required to be `Sync`; the pipeline serializes
/// every call through [`TranslationClient`].
pub trait Translator: Send {
    fn name(&self) -> &'static str;

    fn translate(
        &mut self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;

    /// Whether this engine can translate `source_lang` into `target_lang`.
    fn supports_pair(
        &mut self,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<bool, TranslationError> {
        Ok(true)
    }
}

impl<T: Translator + ?Sized> Translator for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn translate(
        &mut self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        (**self).translate(text, source_lang, target_lang)
    }

    fn supports_pair(
        &mut self,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<bool, TranslationError> {
        (**self).supports_pair(source_lang, target_lang)
    }
}
