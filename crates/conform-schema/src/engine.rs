//! # Validation Orchestrator
//!
//! Public entry point of the engine. Two operations:
//!
//! - [`ConformanceEngine::validate_one`]: one schema, one document (single
//!   JSON or line-delimited). Each record is checked structurally, then
//!   against the supplemental invariants for the schema's identity.
//! - [`ConformanceEngine::validate_batch`]: a schemas directory and a
//!   samples directory, paired through the compiled-in [`SchemaMapping`].
//!
//! Both are single-pass. Under the default [`FailurePolicy::FailFast`] the
//! first failing record (or sample) ends the run and is returned with its
//! label. [`FailurePolicy::CollectAll`] keeps going and returns every
//! failure at the end; unreadable input and missing mapped schemas stay
//! fatal under either policy.

use std::path::Path;

use conform_core::{ConformError, Record, RecordLabel};

use crate::batch::{BatchResolver, BatchSummary, SchemaMapping};
use crate::invariants::InvariantRegistry;
use crate::loader::{load_schema, LoadedSchema};
use crate::records::open_records;
use crate::structural;

/// What to do after a record or sample fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure.
    #[default]
    FailFast,
    /// Check everything, then report all failures in iteration order.
    CollectAll,
}

/// Engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Failure policy for records within a document and samples within a batch.
    pub failure_policy: FailurePolicy,
}

/// Outcome of a successfully validated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    /// Identity of the schema the document was checked against.
    pub schema: String,
    /// Source name of the document.
    pub source: String,
    /// Labels of the validated records, in source order.
    pub validated: Vec<String>,
}

/// Receives progress while a run is underway.
///
/// Events arrive before the run returns, so a caller can report passing
/// records even when a later record fails.
pub trait ProgressSink {
    /// A record passed every check against `schema`.
    fn record_valid(&mut self, label: &RecordLabel, schema: &str);

    /// A batch sample has no schema mapping and was skipped.
    fn sample_skipped(&mut self, _sample: &str) {}
}

/// Discards every event.
impl ProgressSink for () {
    fn record_valid(&mut self, _label: &RecordLabel, _schema: &str) {}
}

/// The validation engine.
#[derive(Debug, Clone, Default)]
pub struct ConformanceEngine {
    config: EngineConfig,
    invariants: InvariantRegistry,
    mapping: SchemaMapping,
}

impl ConformanceEngine {
    /// Engine with the built-in invariant rules and schema mapping.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            invariants: InvariantRegistry::builtin(),
            mapping: SchemaMapping::builtin(),
        }
    }

    /// Replace the invariant registry.
    pub fn with_invariants(mut self, invariants: InvariantRegistry) -> Self {
        self.invariants = invariants;
        self
    }

    /// Replace the sample-to-schema mapping used in batch mode.
    pub fn with_mapping(mut self, mapping: SchemaMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate one document against the schema at `schema_path`.
    ///
    /// # Errors
    ///
    /// - [`ConformError::Load`] if the schema or document cannot be loaded.
    /// - [`ConformError::Parse`] if a line of a line-delimited document is
    ///   not JSON.
    /// - [`ConformError::SchemaViolation`] or [`ConformError::Invariant`] for
    ///   the first failing record (fail-fast), or
    ///   [`ConformError::Failures`] with every failing record (collect-all).
    pub fn validate_one(
        &self,
        schema_path: &Path,
        document_path: &Path,
    ) -> Result<DocumentReport, ConformError> {
        self.validate_one_with(schema_path, document_path, &mut ())
    }

    /// [`validate_one`](Self::validate_one), reporting each passing record
    /// to `sink` as soon as it passes.
    pub fn validate_one_with(
        &self,
        schema_path: &Path,
        document_path: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<DocumentReport, ConformError> {
        let schema = load_schema(schema_path)?;
        self.validate_document(&schema, document_path, sink)
    }

    /// Validate one document against an already loaded schema.
    pub fn validate_document(
        &self,
        schema: &LoadedSchema,
        document_path: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<DocumentReport, ConformError> {
        let records = open_records(document_path)?;
        let source = document_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| document_path.display().to_string());

        let mut validated = Vec::new();
        let mut failures = Vec::new();

        for record in records {
            let record = record?;
            match self.check_record(schema, &record) {
                Ok(()) => {
                    tracing::info!(record = %record.label(), schema = schema.name(), "record valid");
                    sink.record_valid(record.label(), schema.name());
                    validated.push(record.label().to_string());
                }
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::FailFast => return Err(e),
                    FailurePolicy::CollectAll => {
                        tracing::debug!(record = %record.label(), error = %e, "record failed");
                        failures.push(e);
                    }
                },
            }
        }

        if !failures.is_empty() {
            return Err(ConformError::Failures {
                scope: document_path.display().to_string(),
                failures,
            });
        }

        Ok(DocumentReport {
            schema: schema.name().to_string(),
            source,
            validated,
        })
    }

    /// Structural validation followed by the schema's supplemental invariants.
    pub fn check_record(&self, schema: &LoadedSchema, record: &Record) -> Result<(), ConformError> {
        structural::check_record(schema, record)?;
        self.invariants.check(schema.name(), record)
    }

    /// Validate every mapped sample in `samples_dir` against its schema in
    /// `schemas_dir`.
    ///
    /// An empty result (no sample validated) is not an error; callers
    /// inspect [`BatchSummary::is_empty`] to warn.
    ///
    /// # Errors
    ///
    /// - [`ConformError::MappingMissingSchema`] if a mapped schema file does
    ///   not exist. Aborts the batch.
    /// - Any error from [`validate_document`](Self::validate_document) on a
    ///   sample, fail-fast; or [`ConformError::Failures`] under collect-all.
    pub fn validate_batch(
        &self,
        schemas_dir: &Path,
        samples_dir: &Path,
    ) -> Result<BatchSummary, ConformError> {
        self.validate_batch_with(schemas_dir, samples_dir, &mut ())
    }

    /// [`validate_batch`](Self::validate_batch), reporting passing records
    /// and skipped samples to `sink` as they happen.
    pub fn validate_batch_with(
        &self,
        schemas_dir: &Path,
        samples_dir: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<BatchSummary, ConformError> {
        BatchResolver::new(&self.mapping, schemas_dir).run(self, samples_dir, sink)
    }
}
