//! Line-oriented `key=value` handler (Minecraft `.properties`/`.lang` files).
//!
//! Only value parts are translated. Comments, blank lines and lines without
//! `=` are copied through byte for byte, and line order never changes.

use std::collections::HashMap;

use super::{DocumentAdapter, DocumentKind, FormatError, TranslationUnit};

/// Raw lines, each with its own terminator (if any).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesDocument {
    lines: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PropertiesAdapter;

impl PropertiesAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentAdapter for PropertiesAdapter {
    type Document = PropertiesDocument;
    type Address = usize;

    fn kind(&self) -> DocumentKind {
        DocumentKind::Properties
    }

    fn parse(&self, content: &str) -> Result<PropertiesDocument, FormatError> {
        Ok(PropertiesDocument {
            lines: content.split_inclusive('\n').map(str::to_string).collect(),
        })
    }

    fn extract_units(&self, document: &PropertiesDocument) -> Vec<TranslationUnit<usize>> {
        document
            .lines
            .iter()
            .enumerate()
            .filter_map(|(index, line)| {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    return None;
                }
                let (_, value) = line.split_once('=')?;
                Some(TranslationUnit::new(index, value.trim()))
            })
            .collect()
    }

    fn apply_results(
        &self,
        document: &mut PropertiesDocument,
        results: &HashMap<usize, String>,
    ) -> Vec<usize> {
        let mut unresolved = Vec::new();
        for (&index, translated) in results {
            let Some(line) = document.lines.get_mut(index) else {
                unresolved.push(index);
                continue;
            };
            let Some((key, value)) = line.split_once('=') else {
                unresolved.push(index);
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }

            let rebuilt = format!("{}={}{}", key.trim(), translated, newline_of(line));
            *line = rebuilt;
        }
        unresolved
    }

    fn render(&self, document: &PropertiesDocument) -> Result<String, FormatError> {
        Ok(document.lines.concat())
    }
}

/// The line's own terminator; a final line without one gets `\n`.
fn newline_of(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}
