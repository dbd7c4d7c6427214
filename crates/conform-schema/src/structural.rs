//! # Structural Validation
//!
//! Evaluates a record against its compiled schema. The algorithm belongs to
//! the jsonschema crate; this module only collects *every* violation (not
//! just the first) into the shared [`ViolationList`] shape.

use conform_core::{ConformError, Record, Violation, ViolationList};
use serde_json::Value;

use crate::loader::LoadedSchema;

/// Collect all violations of `value` against `schema`, in evaluation order.
pub fn collect_violations(schema: &LoadedSchema, value: &Value) -> ViolationList {
    schema
        .validator()
        .iter_errors(value)
        .map(|err| Violation {
            instance_path: err.instance_path.to_string(),
            schema_path: err.schema_path.to_string(),
            message: err.to_string(),
        })
        .collect::<Vec<_>>()
        .into()
}

/// Check one record's structure.
///
/// # Errors
///
/// Returns [`ConformError::SchemaViolation`] carrying the complete violation
/// list if the record does not conform.
pub fn check_record(schema: &LoadedSchema, record: &Record) -> Result<(), ConformError> {
    let violations = collect_violations(schema, record.value());
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ConformError::SchemaViolation {
            label: record.label().to_string(),
            schema: schema.name().to_string(),
            violations,
        })
    }
}
