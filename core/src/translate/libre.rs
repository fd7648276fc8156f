//! HTTP backend for LibreTranslate-compatible servers (Argos Translate over HTTP).

use std::thread;
use std::time::{Duration, SystemTime};

use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};

use super::retry::{parse_retry_after, RetryPolicy, RetryableFailure};
use super::{TranslationError, Translator};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LanguageInfo {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub targets: Vec<String>,
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

/// Blocking client; call it from worker threads, never from async tasks.
#[derive(Debug)]
pub struct LibreTranslateBackend {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
    languages: Option<Vec<LanguageInfo>>,
}

impl LibreTranslateBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TranslationError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| TranslationError::Network(err.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            api_key: None,
            retry: RetryPolicy::default(),
            languages: None,
        })
    }

    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        });
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Languages installed on the server, fetched once and memoized.
    pub fn languages(&mut self) -> Result<&[LanguageInfo], TranslationError> {
        if self.languages.is_none() {
            let url = format!("{}/languages", self.base_url);
            let response = self.send_with_retry(|| self.http.get(&url))?;
            let languages: Vec<LanguageInfo> = response
                .json()
                .map_err(|err| TranslationError::InvalidResponse(err.to_string()))?;
            debug!("translation server offers {} languages", languages.len());
            self.languages = Some(languages);
        }

        Ok(self.languages.as_deref().unwrap_or_default())
    }

    fn send_with_retry<F>(&self, build: F) -> Result<Response, TranslationError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempts = 0u32;
        loop {
            let (failure, error) = match build().send() {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|value| value.to_str().ok())
                        .and_then(|value| parse_retry_after(value, SystemTime::now()));
                    let body = response.text().unwrap_or_default();
                    (
                        RetryableFailure::Status {
                            status,
                            retry_after,
                        },
                        TranslationError::Http {
                            status: status.as_u16(),
                            message: error_message(&body),
                        },
                    )
                }
                Err(err) => (
                    RetryableFailure::Network,
                    TranslationError::Network(err.to_string()),
                ),
            };

            let Some(delay) = self.retry.next_delay(&failure, attempts) else {
                return Err(error);
            };
            attempts += 1;
            warn!(
                "{error}; retrying in {}ms (attempt {attempts}/{})",
                delay.as_millis(),
                self.retry.max_retries
            );
            thread::sleep(delay);
        }
    }
}

impl Translator for LibreTranslateBackend {
    fn name(&self) -> &'static str {
        "LibreTranslate"
    }

    fn translate(
        &mut self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let url = format!("{}/translate", self.base_url);
        let request = TranslateRequest {
            q: text,
            source: source_lang,
            target: target_lang,
            format: "text",
            api_key: self.api_key.as_deref(),
        };
        let response = self.send_with_retry(|| self.http.post(&url).json(&request))?;
        let body: TranslateResponse = response
            .json()
            .map_err(|err| TranslationError::InvalidResponse(err.to_string()))?;
        Ok(body.translated_text)
    }

    fn supports_pair(
        &mut self,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<bool, TranslationError> {
        let languages = self.languages()?;
        let Some(source) = languages.iter().find(|lang| lang.code == source_lang) else {
            return Ok(false);
        };

        if source.targets.is_empty() {
            // Older servers omit `targets`; any installed language pairs up.
            return Ok(languages.iter().any(|lang| lang.code == target_lang));
        }
        Ok(source.targets.iter().any(|code| code == target_lang))
    }
}

/// Pulls `error` out of a LibreTranslate JSON error body, else returns the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
