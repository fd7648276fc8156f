use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;

use super::{TranslationCache, TranslationError, Translator};
use crate::classifier::should_ignore;
use crate::observer::Reporter;
use crate::splitter::{split, TokenKind};

/// Counters collected over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub backend_calls: usize,
    pub cache_hits: usize,
    pub failures: usize,
}

/// Cached front for a [`Translator`], shared by every batch worker.
///
/// The backend lives behind a single mutex. Holding it covers both the
/// backend call and the cache write, so at most one translation request is in
/// flight at any time no matter how many workers are splitting text.
pub struct TranslationClient {
    backend: Mutex<Box<dyn Translator>>,
    cache: Arc<TranslationCache>,
    source_lang: String,
    target_lang: String,
    reporter: Reporter,
    backend_calls: AtomicUsize,
    cache_hits: AtomicUsize,
    failures: AtomicUsize,
}

impl TranslationClient {
    pub fn new(
        backend: Box<dyn Translator>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            backend: Mutex::new(backend),
            cache: Arc::new(TranslationCache::new()),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            reporter: Reporter::default(),
            backend_calls: AtomicUsize::new(0),
            cache_hits: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        }
    }

    pub fn with_cache(mut self, cache: Arc<TranslationCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            backend_calls: self.backend_calls.load(Ordering::SeqCst),
            cache_hits: self.cache_hits.load(Ordering::SeqCst),
            failures: self.failures.load(Ordering::SeqCst),
        }
    }

    /// Asks the backend whether the configured language pair is available.
    pub fn supports_language_pair(&self) -> Result<bool, TranslationError> {
        let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);
        backend.supports_pair(&self.source_lang, &self.target_lang)
    }

    /// Translates one plain fragment.
    ///
    /// Ignorable text is returned as-is without touching the cache. Backend
    /// failures are logged and degrade to the original text. Whitespace around
    /// the fragment is kept; only the trimmed core is sent and cached.
    pub fn translate(&self, text: &str) -> String {
        if should_ignore(text) {
            return text.to_string();
        }

        let key = text.trim();
        if let Some(hit) = self.cache.get(key) {
            self.cache_hits.fetch_add(1, Ordering::SeqCst);
            return rewrap(text, &hit);
        }

        let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);
        // Another worker may have filled the entry while we waited.
        if let Some(hit) = self.cache.get(key) {
            self.cache_hits.fetch_add(1, Ordering::SeqCst);
            return rewrap(text, &hit);
        }

        self.backend_calls.fetch_add(1, Ordering::SeqCst);
        match backend.translate(key, &self.source_lang, &self.target_lang) {
            Ok(translated) if !translated.trim().is_empty() => {
                self.cache.put(key, translated.as_str());
                rewrap(text, &translated)
            }
            Ok(_) => {
                self.failures.fetch_add(1, Ordering::SeqCst);
                self.reporter
                    .warn(format!("Translation error for '{text}': empty result"));
                text.to_string()
            }
            Err(error) => {
                self.failures.fetch_add(1, Ordering::SeqCst);
                self.reporter
                    .warn(format!("Translation error for '{text}': {error}"));
                text.to_string()
            }
        }
    }

    /// Translates a mixed string: protected spans are copied through, every
    /// candidate span goes through [`TranslationClient::translate`], and a
    /// candidate glued to a color code stays glued to it.
    pub fn translate_fragment(&self, text: &str) -> String {
        let mut output = String::with_capacity(text.len());
        for token in split(text) {
            match token.kind {
                TokenKind::Preserve => output.push_str(&token.text),
                TokenKind::Candidate => {
                    let translated = self.translate(&token.text);
                    if token.glued {
                        output.push_str(translated.trim_start());
                    } else {
                        output.push_str(&translated);
                    }
                }
            }
        }
        output
    }
}

fn rewrap(original: &str, translated: &str) -> String {
    let leading = &original[..original.len() - original.trim_start().len()];
    let trailing = &original[original.trim_end().len()..];
    format!("{leading}{translated}{trailing}")
}
