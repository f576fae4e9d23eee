//! Cohort Validator
//!
//! Validates OHDSI cohort expressions with the CIRCE checker and returns its
//! findings as classified warnings and errors.
//!
//! This library provides:
//! - Engine lifecycle management (the checker runs on a JVM child process)
//! - Marshaling of JSON values, JSON text, or files into engine requests
//! - Severity partitioning and best-effort categorization of engine issues
//! - Configuration and CLI support

pub mod cli;
pub mod config;
pub mod error;
pub mod marshal;
pub mod report;
pub mod runtime;
pub mod validation;
pub mod validator;

// Re-exports for clean public API
pub use config::{Config, EngineSettings};
pub use error::{Result, ValidatorError};
pub use marshal::CohortInput;
pub use runtime::RuntimeState;
pub use validation::{Category, CategoryTable, Severity, ValidationIssue, ValidationResult};
pub use validator::CohortValidator;
