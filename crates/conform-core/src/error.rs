//! # Error Taxonomy
//!
//! Structured error types for the conformance checker, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Every failure is terminal for the operation that raised it. The only
//! conditions that are *not* errors are the designed skip cases: an unmapped
//! sample file in batch mode and a blank line in a line-delimited source.

use std::fmt;

use thiserror::Error;

/// A single schema violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer to the violating value inside the document.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that rejected the value.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.instance_path.is_empty() {
            "(root)"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "{location}: {}", self.message)?;
        if !self.schema_path.is_empty() {
            write!(f, " [schema {}]", self.schema_path)?;
        }
        Ok(())
    }
}

/// Ordered, non-truncated list of violations found for one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationList {
    violations: Vec<Violation>,
}

impl ViolationList {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations, in evaluation order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Iterates over the violations.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }
}

impl From<Vec<Violation>> for ViolationList {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl<'a> IntoIterator for &'a ViolationList {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for ViolationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {v}")?;
        }
        Ok(())
    }
}

/// Coarse classification of an error, used to pick a process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The input content (schema, document, sample set) is at fault.
    Content,
    /// The caller invoked the checker with an unusable argument combination.
    Usage,
}

/// Errors returned by every conformance operation.
#[derive(Error, Debug)]
pub enum ConformError {
    /// A schema or document resource is missing or is not valid structured text.
    #[error("failed to load {path}: {reason}")]
    Load {
        /// Path of the resource that failed to load.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// A line of a line-delimited source is not a JSON value.
    #[error("{source_name}: line {line} is not valid JSON: {reason}")]
    Parse {
        /// Name of the line-delimited source.
        source_name: String,
        /// 1-based physical line number of the offending line.
        line: usize,
        /// Parser diagnostic.
        reason: String,
    },

    /// A record does not conform to its schema.
    #[error("{label} is not valid against {schema}: {} violation(s)", .violations.len())]
    SchemaViolation {
        /// Label of the failing record.
        label: String,
        /// Identity of the schema that was violated.
        schema: String,
        /// Every violation found for the record.
        violations: ViolationList,
    },

    /// A supplemental cross-field rule failed.
    #[error("{label}: {message} (rule '{rule}' of {schema})")]
    Invariant {
        /// Label of the failing record.
        label: String,
        /// Identity of the schema the rule is registered for.
        schema: String,
        /// Name of the rule that failed.
        rule: String,
        /// Description of the broken invariant.
        message: String,
    },

    /// A batch sample maps to a schema file that does not exist.
    #[error("schema {schema} not found for {sample}")]
    MappingMissingSchema {
        /// Sample file name that was mapped.
        sample: String,
        /// Schema file name the sample maps to.
        schema: String,
    },

    /// The entry point was invoked with an unrecognised argument combination.
    #[error("usage error: {0}")]
    Usage(String),

    /// Several failures collected under the collect-all policy.
    #[error("{} failure(s) in {scope}", .failures.len())]
    Failures {
        /// What was being validated (a document path or a samples directory).
        scope: String,
        /// Individual failures, in iteration order.
        failures: Vec<ConformError>,
    },

    /// I/O error while reading a resource.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConformError {
    /// Build a [`ConformError::Load`] from any displayable reason.
    pub fn load(path: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::Load {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Classify the error for exit-status selection.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Usage(_) => ErrorClass::Usage,
            _ => ErrorClass::Content,
        }
    }

    /// The label of the record this error is attributed to, if any.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::SchemaViolation { label, .. } | Self::Invariant { label, .. } => Some(label),
            _ => None,
        }
    }

    /// Returns true for errors that must abort processing regardless of the
    /// failure policy: unreadable input and missing mapped schemas.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Load { .. }
                | Self::Parse { .. }
                | Self::MappingMissingSchema { .. }
                | Self::Usage(_)
                | Self::Io(_)
        )
    }
}
