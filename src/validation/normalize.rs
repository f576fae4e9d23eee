//! Result Normalizer
//!
//! Raw engine issues in, a [`ValidationResult`] out. Emission order is kept
//! inside each partition.

use crate::runtime::RawIssue;

use super::category::CategoryTable;
use super::issue::{Severity, ValidationIssue, ValidationResult};

/// Map engine severity text to [`Severity`].
///
/// Unrecognized or missing severities become `Warning`.
pub fn map_severity(raw: Option<&str>) -> Severity {
    let Some(raw) = raw else {
        return Severity::Warning;
    };
    match raw.trim().to_ascii_uppercase().as_str() {
        "INFO" => Severity::Info,
        "WARNING" | "WARN" => Severity::Warning,
        "ERROR" => Severity::Error,
        "CRITICAL" => Severity::Critical,
        other => {
            log::debug!("Unrecognized engine severity '{}', treating as WARNING", other);
            Severity::Warning
        }
    }
}

/// Classifies and partitions raw issues
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    table: CategoryTable,
}

impl Normalizer {
    pub fn new(table: CategoryTable) -> Self {
        Self { table }
    }

    pub fn normalize_issue(&self, raw: RawIssue) -> ValidationIssue {
        let severity = map_severity(raw.severity.as_deref());
        let category = self.table.classify(&raw.message);
        ValidationIssue {
            message: raw.message,
            severity,
            category,
            kind: raw.kind,
        }
    }

    pub fn normalize(&self, issues: Vec<RawIssue>) -> ValidationResult {
        let mut result = ValidationResult::new();
        for raw in issues {
            result.push(self.normalize_issue(raw));
        }
        result
    }
}
