//! Validation Invoker
//!
//! One blocking engine call per request, no retries. Engine failures come
//! back as [`ValidatorError::EngineValidation`].

use std::time::Instant;

use crate::error::{Result, ValidatorError};
use crate::marshal::CanonicalRequest;
use crate::runtime::{RawIssue, RuntimeHandle};

pub fn invoke(handle: &RuntimeHandle, request: &CanonicalRequest) -> Result<Vec<RawIssue>> {
    let started = Instant::now();
    let issues = handle
        .with_engine(|engine| engine.check(request.as_str()))?
        .map_err(ValidatorError::engine)?;
    log::debug!(
        "Engine returned {} issues for a {} byte expression in {:?}",
        issues.len(),
        request.as_str().len(),
        started.elapsed()
    );
    Ok(issues)
}
