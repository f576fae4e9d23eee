//! Rendering of validation results for the command line

use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use crate::validation::{ValidationIssue, ValidationResult};

/// Output format of the CLI report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total_warnings: usize,
    pub total_errors: usize,
    pub is_valid: bool,
}

/// A validation result tied to the file it came from
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub input_file: String,
    pub warnings: &'a [ValidationIssue],
    pub errors: &'a [ValidationIssue],
    pub summary: Summary,
}

impl<'a> Report<'a> {
    pub fn new(input_file: &Path, result: &'a ValidationResult) -> Self {
        Self {
            input_file: input_file.display().to_string(),
            warnings: &result.warnings,
            errors: &result.errors,
            summary: Summary {
                total_warnings: result.warnings.len(),
                total_errors: result.errors.len(),
                is_valid: result.is_valid(),
            },
        }
    }

    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self),
            OutputFormat::Text => Ok(self.to_text()),
        }
    }

    fn to_text(&self) -> String {
        let mut lines = vec![
            format!("Validation Results for: {}", self.input_file),
            "=".repeat(50),
            format!("Total Warnings: {}", self.summary.total_warnings),
            format!("Total Errors: {}", self.summary.total_errors),
            format!(
                "Valid: {}",
                if self.summary.is_valid { "Yes" } else { "No" }
            ),
            String::new(),
        ];

        for (title, issues) in [("WARNINGS:", self.warnings), ("ERRORS:", self.errors)] {
            if issues.is_empty() {
                continue;
            }
            lines.push(title.to_string());
            lines.push("-".repeat(20));
            for (i, issue) in issues.iter().enumerate() {
                lines.push(format!(
                    "{}. [{}] ({}) {}",
                    i + 1,
                    issue.severity,
                    issue.category,
                    issue.message
                ));
            }
            lines.push(String::new());
        }

        lines.join("\n")
    }
}
