#![deny(missing_docs)]

//! # conform-core: Shared Types for the Contract Conformance Checker
//!
//! This crate defines the types every other crate in the workspace speaks:
//! the error taxonomy, schema violations, and the records extracted from a
//! document source. It has no internal crate dependencies, only
//! `serde_json` and `thiserror` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **One error enum.** [`ConformError`] covers load, parse, schema,
//!    invariant, mapping and usage failures. Each variant carries the
//!    diagnostic context needed to print a useful message without the
//!    caller re-deriving it.
//!
//! 2. **Records are immutable.** A [`Record`] pairs a [`RecordLabel`] with
//!    a parsed document and exposes them read-only. Nothing downstream can
//!    rewrite a document between structural and invariant checks.
//!
//! 3. **Source kind is declared, not sniffed.** [`SourceKind`] is chosen
//!    from the file extension, never from content.

pub mod error;
pub mod record;

pub use error::{ConformError, ErrorClass, Violation, ViolationList};
pub use record::{Record, RecordLabel, SourceKind};
