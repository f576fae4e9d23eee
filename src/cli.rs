//! Command-line driver
//!
//! Exit codes:
//! - 0: no errors
//! - 1: the cohort has errors
//! - 2: configuration failure (engine artifacts, config file, category rules)
//! - 3: input failure (unreadable or malformed cohort, unwritable output)
//! - 4: engine failure

use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::error::ValidatorError;
use crate::report::Report;
use crate::validator::CohortValidator;

pub const EXIT_VALID: u8 = 0;
pub const EXIT_INVALID: u8 = 1;
pub const EXIT_CONFIGURATION: u8 = 2;
pub const EXIT_INPUT: u8 = 3;
pub const EXIT_ENGINE: u8 = 4;

/// Failures producing the report
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("cannot render report: {0}")]
    Render(#[source] serde_json::Error),
    #[error("cannot write output: {0}")]
    Write(#[source] io::Error),
}

/// Validate the configured file and write the report.
///
/// Returns whether the cohort is free of errors.
pub fn run(config: &Config) -> Result<bool> {
    let validator = CohortValidator::from_config(config)?;
    let outcome = validator.validate_cohort_file(&config.input_file);
    validator.shutdown();
    let result = outcome?;

    let rendered = Report::new(&config.input_file, &result)
        .render(config.format)
        .map_err(OutputError::Render)?;

    match &config.output {
        Some(path) => {
            fs::write(path, rendered)
                .map_err(OutputError::Write)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote report to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{rendered}").map_err(OutputError::Write)?;
        }
    }

    Ok(result.is_valid())
}

/// Exit code for a failed run
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(err) = err.downcast_ref::<ValidatorError>() {
        return match err {
            ValidatorError::Configuration { .. } => EXIT_CONFIGURATION,
            ValidatorError::Parse { .. } | ValidatorError::IoAccess { .. } => EXIT_INPUT,
            ValidatorError::EngineValidation { .. } | ValidatorError::RuntimeUnavailable => {
                EXIT_ENGINE
            }
        };
    }
    if err.downcast_ref::<OutputError>().is_some() {
        return EXIT_INPUT;
    }
    // Config file and category rule problems
    EXIT_CONFIGURATION
}
