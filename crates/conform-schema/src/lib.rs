//! # conform-schema: Contract Conformance Engine
//!
//! Validates JSON and line-delimited JSON documents against JSON Schema
//! (Draft 2020-12) contracts, then applies the supplemental cross-field
//! invariants that schema validation cannot express.
//!
//! ## Pipeline
//!
//! ```text
//! ConformanceEngine ─► records (split source) ─► structural (schema check)
//!                                             └► invariants (supplemental rules)
//! ```
//!
//! Batch mode wraps the same pipeline per sample file, driven by the
//! [`batch`] resolver and its compiled-in [`SchemaMapping`].
//!
//! ## Crate Policy
//!
//! - The engine is synchronous and fail-fast by default: the first failing
//!   record (or sample) terminates the run and is reported with its label.
//! - Schemas and records are immutable once loaded.
//! - Schema `$ref`s never trigger network access. References outside the
//!   schema document resolve only to sibling files in the schema directory.
//! - This crate never prints. Passing records and skipped samples are
//!   handed to a [`ProgressSink`] as they happen; final results come back as
//!   reports and errors for the caller to render.

pub mod batch;
pub mod engine;
pub mod invariants;
pub mod loader;
pub mod records;
pub mod structural;

// Re-export primary types.
pub use batch::{BatchResolver, BatchSummary, SampleOutcome, SchemaMapping};
pub use engine::{ConformanceEngine, DocumentReport, EngineConfig, FailurePolicy, ProgressSink};
pub use invariants::{InvariantRegistry, InvariantRule};
pub use loader::{load_schema, LoadedSchema, SchemaCache};
pub use records::{open_records, RecordStream, Records};
