//! Document adapters: pull translation units out of a structured file and put
//! translated values back without touching anything else.

pub mod properties;
pub mod yaml;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("YAML file is empty or invalid")]
    EmptyDocument,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Properties,
    Yaml,
    #[default]
    Auto,
}

impl DocumentKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "properties" => Some(Self::Properties),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }

    /// Guesses the kind from content when the extension says nothing:
    /// `key=value` text that does not open like a YAML document or list is
    /// treated as properties.
    pub fn sniff(content: &str) -> Self {
        let head = content.trim();
        if content.contains('=') && !head.starts_with("---") && !head.starts_with("- ") {
            Self::Properties
        } else {
            Self::Yaml
        }
    }

    /// Extension first, then content; unreadable files default to properties.
    pub fn detect(path: &Path) -> Self {
        if let Some(kind) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
        {
            return kind;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => Self::sniff(&content),
            Err(_) => Self::Properties,
        }
    }

    /// Replaces `Auto` with the detected kind for `path`.
    pub fn resolve(self, path: &Path) -> Self {
        match self {
            Self::Auto => Self::detect(path),
            concrete => concrete,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Properties => "properties",
            Self::Yaml => "yaml",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "properties" => Ok(Self::Properties),
            "yaml" | "yml" => Ok(Self::Yaml),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown document kind: {other}")),
        }
    }
}

/// One addressable leaf string of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit<A> {
    pub address: A,
    pub text: String,
}

impl<A> TranslationUnit<A> {
    pub fn new(address: A, text: impl Into<String>) -> Self {
        Self {
            address,
            text: text.into(),
        }
    }
}

/// Format-specific extraction and reassembly around a shared pipeline.
///
/// Addresses handed out by `extract_units` stay valid for `apply_results` on
/// the same document.
pub trait DocumentAdapter {
    type Document;
    type Address: Clone + Eq + Hash + fmt::Display + Send + 'static;

    fn kind(&self) -> DocumentKind;

    fn parse(&self, content: &str) -> Result<Self::Document, FormatError>;

    fn extract_units(&self, document: &Self::Document) -> Vec<TranslationUnit<Self::Address>>;

    /// Writes translated values into `document`, returning the addresses that
    /// could not be resolved.
    fn apply_results(
        &self,
        document: &mut Self::Document,
        results: &HashMap<Self::Address, String>,
    ) -> Vec<Self::Address>;

    fn render(&self, document: &Self::Document) -> Result<String, FormatError>;
}
