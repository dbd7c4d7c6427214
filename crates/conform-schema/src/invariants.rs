//! # Supplemental Invariants
//!
//! Cross-field rules that JSON Schema cannot express, dispatched by schema
//! identity (the schema's file name). Rules run only after a record has
//! passed structural validation.
//!
//! The registry is an open table: registering a rule for one contract never
//! touches the rules of another, and each rule is a plain function that can
//! be tested on its own.
//!
//! ## Built-in rules
//!
//! | Schema                        | Rule                  |
//! |-------------------------------|-----------------------|
//! | `policy_snapshot.schema.json` | `arm-aligned-lengths` |

use std::collections::BTreeMap;
use std::fmt;

use conform_core::{ConformError, Record};
use serde_json::Value;

/// Identity of the policy snapshot contract.
pub const POLICY_SNAPSHOT_SCHEMA: &str = "policy_snapshot.schema.json";

/// Signature of a rule check: `Err` carries the human-readable message.
pub type RuleFn = fn(&Value) -> Result<(), String>;

/// A named supplemental rule.
#[derive(Clone, Copy)]
pub struct InvariantRule {
    /// Stable rule name, reported on failure.
    pub name: &'static str,
    /// The check itself.
    pub check: RuleFn,
}

impl fmt::Debug for InvariantRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvariantRule").field("name", &self.name).finish()
    }
}

/// Rules keyed by schema identity.
#[derive(Debug, Clone)]
pub struct InvariantRegistry {
    rules: BTreeMap<String, Vec<InvariantRule>>,
}

impl Default for InvariantRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl InvariantRegistry {
    /// A registry with no rules.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// The registry with every built-in contract rule.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(
            POLICY_SNAPSHOT_SCHEMA,
            InvariantRule {
                name: "arm-aligned-lengths",
                check: arm_aligned_lengths,
            },
        );
        registry
    }

    /// Register a rule for a schema identity. Rules run in registration order.
    pub fn register(&mut self, schema: impl Into<String>, rule: InvariantRule) {
        self.rules.entry(schema.into()).or_default().push(rule);
    }

    /// Rules registered for a schema identity.
    pub fn rules_for(&self, schema: &str) -> &[InvariantRule] {
        self.rules.get(schema).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Apply every rule registered for `schema` to `record`.
    ///
    /// # Errors
    ///
    /// Returns [`ConformError::Invariant`] for the first rule that fails.
    pub fn check(&self, schema: &str, record: &Record) -> Result<(), ConformError> {
        for rule in self.rules_for(schema) {
            if let Err(message) = (rule.check)(record.value()) {
                return Err(ConformError::Invariant {
                    label: record.label().to_string(),
                    schema: schema.to_string(),
                    rule: rule.name.to_string(),
                    message,
                });
            }
        }
        Ok(())
    }
}

/// `counts` and `values` must each have as many entries as `arms`.
///
/// A field that is absent or not an array makes the comparison not
/// applicable; type and presence belong to the schema.
pub fn arm_aligned_lengths(doc: &Value) -> Result<(), String> {
    let Some(expected) = doc.get("arms").and_then(Value::as_array).map(Vec::len) else {
        return Ok(());
    };
    for field in ["counts", "values"] {
        if let Some(items) = doc.get(field).and_then(Value::as_array) {
            if items.len() != expected {
                return Err(format!("{field} length must match arms length"));
            }
        }
    }
    Ok(())
}
