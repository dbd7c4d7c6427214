//! # Record Extraction
//!
//! Splits a document source into labelled [`Record`]s.
//!
//! - **Single**: the whole file is one JSON value, labelled with the file name.
//! - **Line-delimited** (`.jsonl`, `.ndjson`): one JSON value per non-blank
//!   line, labelled `<file name>:<physical line>`. Blank lines are skipped but
//!   still count towards the line number.
//!
//! Line-delimited extraction is lazy and forward-only. The first line that
//! does not parse ends the stream with [`ConformError::Parse`]; nothing after
//! it is ever produced.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::Path;

use conform_core::{ConformError, Record, RecordLabel, SourceKind};
use serde_json::Value;

/// Lazy stream of records over a line-delimited JSON reader.
///
/// Lines are read as raw bytes, so a line that is not valid UTF-8 surfaces
/// as a [`ConformError::Parse`] naming that line.
#[derive(Debug)]
pub struct RecordStream<R> {
    reader: R,
    source_name: String,
    line: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> RecordStream<R> {
    /// Stream records from `reader`, labelling them with `source_name`.
    pub fn new(reader: R, source_name: impl Into<String>) -> Self {
        Self {
            reader,
            source_name: source_name.into(),
            line: 0,
            buf: Vec::new(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for RecordStream<R> {
    type Item = Result<Record, ConformError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => self.line += 1,
                Err(e) => {
                    self.done = true;
                    return Some(Err(ConformError::load(
                        &self.source_name,
                        format!("read failed at line {}: {e}", self.line + 1),
                    )));
                }
            }

            if self.buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            // serde_json skips the surrounding whitespace, CR included.
            return Some(match serde_json::from_slice::<Value>(&self.buf) {
                Ok(value) => Ok(Record::new(
                    RecordLabel::line(self.source_name.clone(), self.line),
                    value,
                )),
                Err(e) => {
                    self.done = true;
                    Err(ConformError::Parse {
                        source_name: self.source_name.clone(),
                        line: self.line,
                        reason: e.to_string(),
                    })
                }
            });
        }
    }
}

impl<R: BufRead> FusedIterator for RecordStream<R> {}

/// Records of one document source.
#[derive(Debug)]
pub enum Records {
    /// A single-document source; yields its record once.
    Single(Option<Record>),
    /// A line-delimited source.
    Lines(RecordStream<BufReader<File>>),
}

impl Iterator for Records {
    type Item = Result<Record, ConformError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Single(record) => record.take().map(Ok),
            Self::Lines(stream) => stream.next(),
        }
    }
}

impl FusedIterator for Records {}

/// Open `path` and extract its records according to its extension.
///
/// # Errors
///
/// Returns [`ConformError::Load`] if the file cannot be opened, or, in
/// single mode, if it is not valid JSON. Line-level parse errors surface
/// lazily from the returned iterator.
pub fn open_records(path: &Path) -> Result<Records, ConformError> {
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    match SourceKind::from_path(path) {
        SourceKind::LineDelimited => {
            let file = File::open(path)
                .map_err(|e| ConformError::load(path.display(), format!("cannot open file: {e}")))?;
            tracing::debug!(source = %source_name, "extracting line-delimited records");
            Ok(Records::Lines(RecordStream::new(BufReader::new(file), source_name)))
        }
        SourceKind::Single => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| ConformError::load(path.display(), format!("cannot read file: {e}")))?;
            let value: Value = serde_json::from_str(&content)
                .map_err(|e| ConformError::load(path.display(), format!("invalid JSON: {e}")))?;
            tracing::debug!(source = %source_name, "extracted single record");
            Ok(Records::Single(Some(Record::new(
                RecordLabel::whole(source_name),
                value,
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn labels(input: &str) -> Vec<String> {
        RecordStream::new(input.as_bytes(), "s.jsonl")
            .map(|r| r.unwrap().label().to_string())
            .collect()
    }

    #[test]
    fn one_record_per_line() {
        assert_eq!(
            labels("{\"a\":1}\n{\"a\":2}\n{\"a\":3}\n"),
            vec!["s.jsonl:1", "s.jsonl:2", "s.jsonl:3"]
        );
    }

    #[test]
    fn blank_lines_skipped_without_shifting_labels() {
        assert_eq!(
            labels("{\"a\":1}\n\n   \n{\"a\":2}"),
            vec!["s.jsonl:1", "s.jsonl:4"]
        );
    }

    #[test]
    fn crlf_and_surrounding_whitespace_are_trimmed() {
        let records: Vec<Record> = RecordStream::new("  {\"a\":1}  \r\n[2]\r\n".as_bytes(), "s.jsonl")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(records[0].value(), &json!({"a": 1}));
        assert_eq!(records[1].value(), &json!([2]));
    }

    #[test]
    fn scalars_are_records_too() {
        assert_eq!(labels("1\n\"x\"\nnull\n").len(), 3);
    }

    #[test]
    fn malformed_line_stops_the_stream() {
        let mut stream = RecordStream::new("{\"a\":1}\n{not json\n{\"a\":3}\n".as_bytes(), "s.jsonl");
        assert!(stream.next().unwrap().is_ok());
        match stream.next().unwrap().unwrap_err() {
            ConformError::Parse {
                source_name, line, ..
            } => {
                assert_eq!(source_name, "s.jsonl");
                assert_eq!(line, 2);
            }
            other => panic!("expected Parse, got: {other}"),
        }
        assert!(stream.next().is_none(), "line 3 must never be produced");
        assert!(stream.next().is_none());
    }

    #[test]
    fn invalid_utf8_line_is_parse_error_for_that_line() {
        let mut stream = RecordStream::new(&b"{}\n\"\xff\"\n{}\n"[..], "ev.jsonl");
        assert!(stream.next().unwrap().is_ok());
        match stream.next().unwrap().unwrap_err() {
            ConformError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected Parse, got: {other}"),
        }
        assert!(stream.next().is_none());
    }

    #[test]
    fn empty_source_yields_nothing() {
        assert!(labels("").is_empty());
        assert!(labels("\n\n").is_empty());
    }

    #[test]
    fn open_single_document() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("snap.json");
        std::fs::write(&path, "{\n  \"arms\": []\n}\n").unwrap();
        let mut records = open_records(&path).unwrap();
        assert!(matches!(records, Records::Single(Some(_))));
        let record = records.next().unwrap().unwrap();
        assert_eq!(record.label().to_string(), "snap.json");
        assert!(records.next().is_none());
    }

    #[test]
    fn open_single_document_invalid_json_is_load_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("broken.json");
        std::fs::write(&path, "{\"a\": ").unwrap();
        match open_records(&path).unwrap_err() {
            ConformError::Load { reason, .. } => assert!(reason.contains("invalid JSON")),
            other => panic!("expected Load, got: {other}"),
        }
    }

    #[test]
    fn open_line_delimited_document() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("events.jsonl");
        std::fs::write(&path, "{\"a\":1}\n\n{\"a\":2}\n").unwrap();
        let records = open_records(&path).unwrap();
        assert!(matches!(records, Records::Lines(_)));
        let labels: Vec<String> = records.map(|r| r.unwrap().label().to_string()).collect();
        assert_eq!(labels, vec!["events.jsonl:1", "events.jsonl:3"]);
    }

    #[test]
    fn open_missing_document_is_load_error() {
        for name in ["nope.json", "nope.jsonl"] {
            let path = Path::new("/tmp/conform-missing-dir-12345").join(name);
            assert!(matches!(
                open_records(&path),
                Err(ConformError::Load { .. })
            ));
        }
    }
}
