//! Object Marshaler
//!
//! Turns caller input into the canonical JSON text sent to the engine. Only
//! syntax is checked here; the engine owns the cohort schema.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, ValidatorError};

/// Caller-supplied cohort expression
#[derive(Debug, Clone, PartialEq)]
pub enum CohortInput {
    /// Already-parsed JSON document
    Value(Value),
    /// JSON text
    Text(String),
    /// File holding JSON text
    File(PathBuf),
}

impl From<Value> for CohortInput {
    fn from(value: Value) -> Self {
        CohortInput::Value(value)
    }
}

impl From<&str> for CohortInput {
    fn from(text: &str) -> Self {
        CohortInput::Text(text.to_string())
    }
}

impl From<String> for CohortInput {
    fn from(text: String) -> Self {
        CohortInput::Text(text)
    }
}

impl From<&Path> for CohortInput {
    fn from(path: &Path) -> Self {
        CohortInput::File(path.to_path_buf())
    }
}

impl From<PathBuf> for CohortInput {
    fn from(path: PathBuf) -> Self {
        CohortInput::File(path)
    }
}

/// Compact JSON text of one cohort expression, ready for the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest(String);

impl CanonicalRequest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn marshal(input: CohortInput) -> Result<CanonicalRequest> {
    match input {
        CohortInput::Value(value) => marshal_value(&value),
        CohortInput::Text(text) => marshal_text(&text),
        CohortInput::File(path) => marshal_file(&path),
    }
}

/// Serialize any structured value
pub fn marshal_value<T: Serialize + ?Sized>(value: &T) -> Result<CanonicalRequest> {
    serde_json::to_string(value)
        .map(CanonicalRequest)
        .map_err(|e| ValidatorError::parse(&e))
}

/// Check that `text` is well-formed JSON and re-emit it compactly.
///
/// Key order is preserved.
pub fn marshal_text(text: &str) -> Result<CanonicalRequest> {
    let value: Value = serde_json::from_str(text).map_err(|e| ValidatorError::parse(&e))?;
    marshal_value(&value)
}

/// Read and marshal a JSON file
pub fn marshal_file(path: &Path) -> Result<CanonicalRequest> {
    let bytes = fs::read(path).map_err(|source| ValidatorError::IoAccess {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Read {} bytes from {}", bytes.len(), path.display());

    // Invalid UTF-8 is a syntax problem, not an access problem
    let value: Value = serde_json::from_slice(&bytes).map_err(|e| ValidatorError::parse(&e))?;
    marshal_value(&value)
}
