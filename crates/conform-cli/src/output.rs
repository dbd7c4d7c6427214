//! # Output Formatting
//!
//! Human-readable rendering of reports and failures. Successes go to the
//! report writer (stdout); failures go to the error writer (stderr).

use std::io::{self, Write};

use conform_core::{ConformError, RecordLabel};
use conform_schema::{BatchSummary, ProgressSink};

/// Prints success and skip lines as the engine reports them.
///
/// The first write error is kept and every later event is dropped;
/// [`finish`](Self::finish) returns it.
pub struct ProgressWriter<W> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> ProgressWriter<W> {
    /// Wrap the report writer.
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Flush, surfacing the first write error if there was one.
    pub fn finish(mut self) -> io::Result<()> {
        match self.error.take() {
            Some(e) => Err(e),
            None => self.out.flush(),
        }
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        if self.error.is_none() {
            if let Err(e) = writeln!(self.out, "{line}") {
                self.error = Some(e);
            }
        }
    }
}

impl<W: Write> ProgressSink for ProgressWriter<W> {
    fn record_valid(&mut self, label: &RecordLabel, schema: &str) {
        self.emit(format_args!("✓ {label} valid against {schema}"));
    }

    fn sample_skipped(&mut self, sample: &str) {
        self.emit(format_args!("⚠ Skipping {sample}: no schema mapping defined"));
    }
}

/// The closing line of a successful batch.
pub fn write_batch_footer(out: &mut impl Write, summary: &BatchSummary) -> io::Result<()> {
    if summary.is_empty() {
        writeln!(out, "⚠ No samples validated")
    } else {
        writeln!(
            out,
            "\n✓ {} sample file(s) validated successfully",
            summary.validated
        )
    }
}

/// Headline plus every violation (or collected failure) underneath it.
pub fn write_failure(err: &mut impl Write, error: &ConformError) -> io::Result<()> {
    writeln!(err, "❌ Validation failed: {error}")?;
    write_details(err, error, 1)
}

fn write_details(err: &mut impl Write, error: &ConformError, depth: usize) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    match error {
        ConformError::SchemaViolation { violations, .. } => {
            for v in violations {
                writeln!(err, "{indent}{v}")?;
            }
        }
        ConformError::Failures { failures, .. } => {
            for failure in failures {
                writeln!(err, "{indent}- {failure}")?;
                write_details(err, failure, depth + 1)?;
            }
        }
        _ => {}
    }
    Ok(())
}
