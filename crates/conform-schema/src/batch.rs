//! # Batch Resolution
//!
//! Pairs every file in a samples directory with the schema it must satisfy,
//! using a fixed, compiled-in [`SchemaMapping`] keyed by exact file name.
//!
//! - Hidden entries (leading `.`) are ignored.
//! - Unmapped samples are skipped with a notice; this is not an error.
//! - A mapped schema that is missing from the schemas directory aborts the
//!   whole batch with [`ConformError::MappingMissingSchema`].
//!
//! Samples are processed in file-name order so that "the first failure" is
//! the same on every platform.

use std::path::{Path, PathBuf};

use conform_core::ConformError;

use crate::engine::{ConformanceEngine, DocumentReport, FailurePolicy, ProgressSink};
use crate::loader::SchemaCache;

/// Marker prefix of hidden directory entries.
pub const HIDDEN_FILE_MARKER: char = '.';

/// Built-in sample file name to schema file name table.
pub const BUILTIN_SCHEMA_MAPPING: &[(&str, &str)] =
    &[("aussensensor.jsonl", "aussen_event.schema.json")];

/// Exact-match table from sample file name to schema file name.
#[derive(Debug, Clone, Copy)]
pub struct SchemaMapping {
    entries: &'static [(&'static str, &'static str)],
}

impl Default for SchemaMapping {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SchemaMapping {
    /// The compiled-in mapping.
    pub const fn builtin() -> Self {
        Self::from_static(BUILTIN_SCHEMA_MAPPING)
    }

    /// A mapping over a static table.
    pub const fn from_static(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Schema file name for a sample, if the sample is mapped.
    pub fn schema_for(&self, sample: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == sample)
            .map(|(_, schema)| *schema)
    }

}

/// What happened to one sample of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Every record of the sample validated.
    Validated(DocumentReport),
    /// The sample has no schema mapping.
    Skipped(String),
}

/// Result of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Number of sample files whose every record validated.
    pub validated: usize,
    /// Per-sample outcomes, in processing order.
    pub outcomes: Vec<SampleOutcome>,
}

impl BatchSummary {
    /// True when no sample was validated. A warning outcome, not a failure.
    pub fn is_empty(&self) -> bool {
        self.validated == 0
    }

    /// Names of skipped samples, in processing order.
    pub fn skipped(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SampleOutcome::Skipped(name) => Some(name.as_str()),
                SampleOutcome::Validated(_) => None,
            })
            .collect()
    }

    /// Reports of validated samples, in processing order.
    pub fn reports(&self) -> Vec<&DocumentReport> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SampleOutcome::Validated(report) => Some(report),
                SampleOutcome::Skipped(_) => None,
            })
            .collect()
    }
}

/// Resolves samples to schemas and drives their validation.
#[derive(Debug)]
pub struct BatchResolver<'a> {
    mapping: &'a SchemaMapping,
    schemas_dir: &'a Path,
    cache: SchemaCache,
}

impl<'a> BatchResolver<'a> {
    /// Resolver over `schemas_dir` using `mapping`.
    pub fn new(mapping: &'a SchemaMapping, schemas_dir: &'a Path) -> Self {
        Self {
            mapping,
            schemas_dir,
            cache: SchemaCache::new(),
        }
    }

    /// Resolve a sample file name to its schema path.
    ///
    /// Returns `Ok(None)` for unmapped samples.
    ///
    /// # Errors
    ///
    /// Returns [`ConformError::MappingMissingSchema`] if the sample is mapped
    /// but the schema file does not exist.
    pub fn resolve(&self, sample: &str) -> Result<Option<PathBuf>, ConformError> {
        let Some(schema) = self.mapping.schema_for(sample) else {
            return Ok(None);
        };
        let schema_path = self.schemas_dir.join(schema);
        if !schema_path.exists() {
            return Err(ConformError::MappingMissingSchema {
                sample: sample.to_string(),
                schema: schema.to_string(),
            });
        }
        Ok(Some(schema_path))
    }

    /// Validate every mapped sample in `samples_dir`, reporting progress to
    /// `sink` as it happens.
    pub fn run(
        mut self,
        engine: &ConformanceEngine,
        samples_dir: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<BatchSummary, ConformError> {
        let mut summary = BatchSummary::default();
        let mut failures = Vec::new();

        for (name, sample_path) in list_samples(samples_dir)? {
            let Some(schema_path) = self.resolve(&name)? else {
                tracing::debug!(sample = %name, "skipping sample: no schema mapping defined");
                sink.sample_skipped(&name);
                summary.outcomes.push(SampleOutcome::Skipped(name));
                continue;
            };

            let schema = self.cache.get_or_load(&schema_path)?;
            match engine.validate_document(&schema, &sample_path, sink) {
                Ok(report) => {
                    tracing::info!(sample = %name, schema = schema.name(), "sample valid");
                    summary.validated += 1;
                    summary.outcomes.push(SampleOutcome::Validated(report));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => match engine.config().failure_policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::CollectAll => failures.push(e),
                },
            }
        }

        if !failures.is_empty() {
            return Err(ConformError::Failures {
                scope: samples_dir.display().to_string(),
                failures,
            });
        }

        if summary.is_empty() {
            tracing::debug!(samples_dir = %samples_dir.display(), "no samples validated");
        }

        Ok(summary)
    }
}

/// Non-hidden entries of `samples_dir` as `(file name, path)`, sorted by name.
fn list_samples(samples_dir: &Path) -> Result<Vec<(String, PathBuf)>, ConformError> {
    let entries = std::fs::read_dir(samples_dir).map_err(|e| {
        ConformError::load(
            samples_dir.display(),
            format!("cannot read samples directory: {e}"),
        )
    })?;

    let mut samples = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(HIDDEN_FILE_MARKER) {
            tracing::debug!(entry = %name, "ignoring hidden entry");
            continue;
        }
        samples.push((name, entry.path()));
    }
    samples.sort();
    Ok(samples)
}
