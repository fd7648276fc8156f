//! Stub translators shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::translate::{TranslationError, Translator};

/// Translator driven by a closure; counts every backend call.
pub struct FnTranslator<F> {
    pub calls: Arc<AtomicUsize>,
    respond: F,
}

impl<F> FnTranslator<F>
where
    F: FnMut(&str) -> Result<String, TranslationError> + Send,
{
    pub fn new(respond: F) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            respond,
        }
    }
}

impl<F> Translator for FnTranslator<F>
where
    F: FnMut(&str) -> Result<String, TranslationError> + Send,
{
    fn name(&self) -> &'static str {
        "stub"
    }

    fn translate(
        &mut self,
        text: &str,
        _source_lang: &str,
        _target_lang: &str,
    ) -> Result<String, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(text)
    }
}

/// Wraps every text in brackets and hands back the call counter.
pub fn bracketing() -> (Box<dyn Translator>, Arc<AtomicUsize>) {
    let translator = FnTranslator::new(|text: &str| Ok(format!("[{text}]")));
    let calls = Arc::clone(&translator.calls);
    (Box::new(translator), calls)
}

pub fn failing() -> (Box<dyn Translator>, Arc<AtomicUsize>) {
    let translator = FnTranslator::new(|_: &str| {
        Err(TranslationError::Failure("engine unavailable".into()))
    });
    let calls = Arc::clone(&translator.calls);
    (Box::new(translator), calls)
}
