//! # Validate Command
//!
//! Decides between single-document and batch mode, runs the engine and
//! renders the outcome.
//!
//! Batch mode wins when both `--schemas` and `--samples` are given. Otherwise
//! exactly two positional paths (schema, document) are required.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use conform_core::{ConformError, ErrorClass};
use conform_schema::{ConformanceEngine, EngineConfig, FailurePolicy};

use crate::output::{write_batch_footer, write_failure, ProgressWriter};
use crate::{EXIT_FAILED, EXIT_OK, EXIT_USAGE};

/// Printed when the argument combination selects no mode.
pub const USAGE: &str = "Usage: conform <SCHEMA> <DOCUMENT>\n       conform --schemas <DIR> --samples <DIR>";

/// Arguments for contract validation.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Schema file followed by the document to check (.json, .jsonl or .ndjson).
    #[arg(value_name = "PATH", num_args = 0..)]
    pub positional: Vec<PathBuf>,

    /// Directory holding the contract schemas (batch mode).
    #[arg(long, value_name = "DIR")]
    pub schemas: Option<PathBuf>,

    /// Directory of sample files to check against their mapped schemas (batch mode).
    #[arg(long, value_name = "DIR")]
    pub samples: Option<PathBuf>,

    /// Report every failing record instead of stopping at the first one.
    #[arg(long)]
    pub keep_going: bool,
}

/// The operating mode selected by the arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// One document against one schema.
    Single {
        /// Schema file.
        schema: PathBuf,
        /// Document file.
        document: PathBuf,
    },
    /// Every mapped sample in a directory.
    Batch {
        /// Schemas directory.
        schemas: PathBuf,
        /// Samples directory.
        samples: PathBuf,
    },
}

impl ValidateArgs {
    /// Select the mode, or fail with [`ConformError::Usage`].
    pub fn mode(&self) -> Result<Mode, ConformError> {
        if let (Some(schemas), Some(samples)) = (&self.schemas, &self.samples) {
            return Ok(Mode::Batch {
                schemas: schemas.clone(),
                samples: samples.clone(),
            });
        }
        match self.positional.as_slice() {
            [schema, document] => Ok(Mode::Single {
                schema: schema.clone(),
                document: document.clone(),
            }),
            _ => Err(ConformError::Usage(
                "expected SCHEMA DOCUMENT or --schemas DIR --samples DIR".to_string(),
            )),
        }
    }

    /// Engine configuration derived from the flags.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            failure_policy: if self.keep_going {
                FailurePolicy::CollectAll
            } else {
                FailurePolicy::FailFast
            },
        }
    }
}

/// Execute the validate command against stdout and stderr.
pub fn run_validate(args: &ValidateArgs) -> anyhow::Result<u8> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    execute(args, &mut stdout.lock(), &mut stderr.lock())
}

/// Execute the validate command, writing reports to `out` and failures to
/// `err`. Returns the process exit code.
///
/// Only failures to write the output itself surface as `Err`.
pub fn execute(args: &ValidateArgs, out: &mut impl Write, err: &mut impl Write) -> anyhow::Result<u8> {
    let mode = match args.mode() {
        Ok(mode) => mode,
        Err(e) => {
            tracing::debug!(error = %e, "no mode selected");
            writeln!(out, "{USAGE}").context("failed to write usage")?;
            return Ok(EXIT_USAGE);
        }
    };

    let engine = ConformanceEngine::new(args.engine_config());
    tracing::info!(?mode, policy = ?engine.config().failure_policy, "validating");

    // Success lines go out as records pass, ahead of any failure report.
    let mut progress = ProgressWriter::new(&mut *out);
    let outcome = match &mode {
        Mode::Single { schema, document } => engine
            .validate_one_with(schema, document, &mut progress)
            .map(|_| None),
        Mode::Batch { schemas, samples } => engine
            .validate_batch_with(schemas, samples, &mut progress)
            .map(Some),
    };
    progress.finish().context("failed to write report")?;

    match outcome {
        Ok(None) => Ok(EXIT_OK),
        Ok(Some(summary)) => {
            write_batch_footer(out, &summary)
                .and_then(|()| out.flush())
                .context("failed to write report")?;
            Ok(EXIT_OK)
        }
        Err(e) => report_failure(err, &e),
    }
}

fn report_failure(err: &mut impl Write, error: &ConformError) -> anyhow::Result<u8> {
    write_failure(err, error).context("failed to write failure report")?;
    Ok(match error.class() {
        ErrorClass::Usage => EXIT_USAGE,
        ErrorClass::Content => EXIT_FAILED,
    })
}
