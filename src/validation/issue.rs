//! Validation result types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// `Error` and `Critical` issues land in the errors partition
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort nature of an issue, derived from its message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    UnusedConcept,
    EmptyValue,
    Duplicate,
    TimeWindow,
    MissingCriteria,
    Contradiction,
    DomainType,
    Range,
    ExitCriteria,
    EventsProgression,
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::UnusedConcept => "UnusedConcept",
            Category::EmptyValue => "EmptyValue",
            Category::Duplicate => "Duplicate",
            Category::TimeWindow => "TimeWindow",
            Category::MissingCriteria => "MissingCriteria",
            Category::Contradiction => "Contradiction",
            Category::DomainType => "DomainType",
            Category::Range => "Range",
            Category::ExitCriteria => "ExitCriteria",
            Category::EventsProgression => "EventsProgression",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub message: String,
    pub severity: Severity,
    pub category: Category,
    /// Engine-side issue type, when reported
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Issues partitioned by severity, each side in engine emission order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub warnings: Vec<ValidationIssue>,
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an issue to the partition its severity selects
    pub fn push(&mut self, issue: ValidationIssue) {
        if issue.severity.is_error() {
            self.errors.push(issue);
        } else {
            self.warnings.push(issue);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len() + self.errors.len()
    }
}
