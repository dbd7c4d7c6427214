//! # Records
//!
//! A [`Record`] is one document extracted from a source, paired with a
//! [`RecordLabel`] naming where it came from. Single-document sources yield
//! one record labelled with the source name; line-delimited sources yield one
//! record per non-blank line labelled `<source>:<line>`.

use std::fmt;
use std::path::Path;

use serde_json::Value;

/// File extensions that select line-delimited extraction.
pub const LINE_DELIMITED_EXTENSIONS: &[&str] = &["jsonl", "ndjson"];

/// How a document source is split into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The whole source is one JSON value.
    Single,
    /// One JSON value per non-blank line.
    LineDelimited,
}

impl SourceKind {
    /// Select the source kind from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if LINE_DELIMITED_EXTENSIONS.contains(&ext) => Self::LineDelimited,
            _ => Self::Single,
        }
    }
}

/// Where a record came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordLabel {
    source: String,
    line: Option<usize>,
}

impl RecordLabel {
    /// Label for a single-document source.
    pub fn whole(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            line: None,
        }
    }

    /// Label for a record on a 1-based physical line of a line-delimited source.
    pub fn line(source: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            line: Some(line),
        }
    }

    /// The source name.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The physical line number, if the record came from a line-delimited source.
    pub fn line_number(&self) -> Option<usize> {
        self.line
    }
}

impl fmt::Display for RecordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}", self.source),
            None => f.write_str(&self.source),
        }
    }
}

/// A labelled document. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    label: RecordLabel,
    value: Value,
}

impl Record {
    /// Pair a label with a parsed document.
    pub fn new(label: RecordLabel, value: Value) -> Self {
        Self { label, value }
    }

    /// The record's label.
    pub fn label(&self) -> &RecordLabel {
        &self.label
    }

    /// The parsed document.
    pub fn value(&self) -> &Value {
        &self.value
    }
}
