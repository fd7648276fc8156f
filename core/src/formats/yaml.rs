use std::collections::HashMap;
use std::fmt;

use serde_yaml::Value;

use super::{DocumentAdapter, DocumentKind, FormatError, TranslationUnit};
use crate::classifier::should_ignore;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    Key(Value),
    Index(usize),
}

/// Typed location of a scalar inside a YAML tree, built during extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct YamlPath(Vec<PathStep>);

impl YamlPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    fn child(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }
}

impl fmt::Display for YamlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, step) in self.0.iter().enumerate() {
            match step {
                PathStep::Key(key) => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(&key_label(key))?;
                }
                PathStep::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null => "~".to_string(),
        other => serde_yaml::to_string(other)
            .map(|text| text.trim().to_string())
            .unwrap_or_default(),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlAdapter;

impl YamlAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentAdapter for YamlAdapter {
    type Document = Value;
    type Address = YamlPath;

    fn kind(&self) -> DocumentKind {
        DocumentKind::Yaml
    }

    fn parse(&self, content: &str) -> Result<Value, FormatError> {
        if content.trim().is_empty() {
            return Err(FormatError::EmptyDocument);
        }
        let document: Value = serde_yaml::from_str(content)
            .map_err(|err| FormatError::ParseError(err.to_string()))?;
        if document.is_null() {
            return Err(FormatError::EmptyDocument);
        }
        Ok(document)
    }

    fn extract_units(&self, document: &Value) -> Vec<TranslationUnit<YamlPath>> {
        let mut units = Vec::new();
        collect(document, YamlPath::root(), &mut units);
        units
    }

    fn apply_results(
        &self,
        document: &mut Value,
        results: &HashMap<YamlPath, String>,
    ) -> Vec<YamlPath> {
        let mut unresolved = Vec::new();
        for (path, translated) in results {
            match resolve_mut(document, path) {
                Some(slot) if slot.is_string() => *slot = Value::String(translated.clone()),
                _ => unresolved.push(path.clone()),
            }
        }
        unresolved
    }

    fn render(&self, document: &Value) -> Result<String, FormatError> {
        if document.is_null() {
            return Err(FormatError::EmptyDocument);
        }
        serde_yaml::to_string(document).map_err(|err| FormatError::SerializationError(err.to_string()))
    }
}

fn collect(node: &Value, path: YamlPath, units: &mut Vec<TranslationUnit<YamlPath>>) {
    match node {
        Value::String(text) => {
            if !should_ignore(text) {
                units.push(TranslationUnit::new(path, text.as_str()));
            }
        }
        Value::Mapping(mapping) => {
            for (key, value) in mapping {
                collect(value, path.child(PathStep::Key(key.clone())), units);
            }
        }
        Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                collect(item, path.child(PathStep::Index(index)), units);
            }
        }
        Value::Tagged(tagged) => collect(&tagged.value, path, units),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Walks `path` from the root; the returned slot is already stripped of tags.
fn resolve_mut<'a>(root: &'a mut Value, path: &YamlPath) -> Option<&'a mut Value> {
    let mut node = untagged_mut(root);
    for step in path.steps() {
        let next = match (step, node) {
            (PathStep::Key(key), Value::Mapping(mapping)) => mapping.get_mut(key)?,
            (PathStep::Index(index), Value::Sequence(items)) => items.get_mut(*index)?,
            _ => return None,
        };
        node = untagged_mut(next);
    }
    Some(node)
}

fn untagged_mut(value: &mut Value) -> &mut Value {
    match value {
        Value::Tagged(tagged) => untagged_mut(&mut tagged.value),
        other => other,
    }
}
