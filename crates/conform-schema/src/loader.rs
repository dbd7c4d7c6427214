//! # Schema Loader
//!
//! Reads a JSON Schema (Draft 2020-12) from disk and compiles it into a
//! reusable validator. The schema's identity is its file name, which is also
//! the key the invariant registry dispatches on.
//!
//! ## Schema Resolution
//!
//! Internal `$ref`s of the form `#/$defs/<name>` are resolved by the
//! jsonschema crate natively against the schema's own document.
//!
//! Any other `$ref` goes through [`SiblingSchemaRetriever`], which maps the
//! final path segment of the referenced URI to a file in the schema's own
//! directory. Nothing is ever fetched over the network: a reference that
//! has no local sibling fails compilation.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use conform_core::ConformError;
use jsonschema::Validator;
use serde_json::Value;

/// Retriever that resolves `$ref` URIs to schema files next to the root schema.
struct SiblingSchemaRetriever {
    /// Directory of the schema being compiled.
    base_dir: PathBuf,
}

impl jsonschema::Retrieve for SiblingSchemaRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        let filename = uri_str
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| format!("cannot resolve schema reference: {uri_str}"))?;

        let candidate = self.base_dir.join(filename);
        if !candidate.is_file() {
            return Err(format!(
                "schema reference {uri_str} has no local file {}",
                candidate.display()
            )
            .into());
        }

        tracing::debug!(uri = uri_str, path = %candidate.display(), "resolved schema reference");
        let content = std::fs::read_to_string(&candidate)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// A schema loaded from disk and compiled for validation.
///
/// Immutable after load. Cheap to share across a batch through [`Arc`].
pub struct LoadedSchema {
    name: String,
    path: PathBuf,
    validator: Validator,
}

impl fmt::Debug for LoadedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedSchema")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish()
    }
}

impl LoadedSchema {
    /// Schema identity: the file name, e.g. `policy_snapshot.schema.json`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compiled Draft 2020-12 validator.
    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

/// Load and compile the schema at `path`.
///
/// # Errors
///
/// Returns [`ConformError::Load`] if the file cannot be read, is not valid
/// JSON, or does not compile as a Draft 2020-12 schema (including an
/// unresolvable `$ref`).
pub fn load_schema(path: &Path) -> Result<LoadedSchema, ConformError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConformError::load(path.display(), format!("cannot read file: {e}")))?;

    let raw: Value = serde_json::from_str(&content)
        .map_err(|e| ConformError::load(path.display(), format!("invalid JSON: {e}")))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let base_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let validator = jsonschema::options()
        .with_draft(jsonschema::Draft::Draft202012)
        .with_retriever(SiblingSchemaRetriever { base_dir })
        .build(&raw)
        .map_err(|e| {
            ConformError::load(path.display(), format!("schema does not compile: {e}"))
        })?;

    tracing::debug!(schema = %name, path = %path.display(), "loaded schema");

    Ok(LoadedSchema {
        name,
        path: path.to_path_buf(),
        validator,
    })
}

/// Per-run cache of compiled schemas, keyed by canonical path.
#[derive(Debug, Default)]
pub struct SchemaCache {
    schemas: HashMap<PathBuf, Arc<LoadedSchema>>,
}

impl SchemaCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached schema for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<LoadedSchema>, ConformError> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if let Some(schema) = self.schemas.get(&key) {
            return Ok(Arc::clone(schema));
        }
        let schema = Arc::new(load_schema(path)?);
        self.schemas.insert(key, Arc::clone(&schema));
        Ok(schema)
    }

    /// Number of schemas loaded so far.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns true if nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
