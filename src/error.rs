//! Error taxonomy for the validation bridge.
//!
//! Every failure surfaced by the public API is one of these variants. None of
//! them are retried internally.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::runtime::EngineFault;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, ValidatorError>;

/// Line/column inside a JSON document (both 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Error)]
pub enum ValidatorError {
    /// Engine artifacts are absent or the engine could not be brought up
    #[error("{message}: {} ({hint})", .path.display())]
    Configuration {
        path: PathBuf,
        message: String,
        hint: String,
    },

    /// Input is not well-formed JSON
    #[error("invalid cohort JSON{}: {message}", describe_position(.position))]
    Parse {
        message: String,
        position: Option<Position>,
    },

    /// Input file is missing or unreadable
    #[error("cannot read {}: {source}", .path.display())]
    IoAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The engine failed while evaluating the expression
    #[error("engine validation failed: {message}")]
    EngineValidation {
        message: String,
        #[source]
        cause: EngineFault,
    },

    /// The runtime was shut down; it cannot be restarted
    #[error("validation runtime is shut down")]
    RuntimeUnavailable,
}

fn describe_position(position: &Option<Position>) -> String {
    match position {
        Some(position) => format!(" at {position}"),
        None => String::new(),
    }
}

impl ValidatorError {
    pub(crate) fn configuration(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        ValidatorError::Configuration {
            path: path.into(),
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Wrap a fault raised at the engine boundary, keeping the engine's own
    /// message when it reported one.
    pub(crate) fn engine(cause: EngineFault) -> Self {
        let message = match &cause {
            EngineFault::Reported { message, .. } => message.clone(),
            other => other.to_string(),
        };
        ValidatorError::EngineValidation { message, cause }
    }

    pub(crate) fn parse(err: &serde_json::Error) -> Self {
        // serde_json reports line 0 for errors that are not tied to input text
        let position = (err.line() > 0).then(|| Position {
            line: err.line(),
            column: err.column(),
        });
        ValidatorError::Parse {
            message: err.to_string(),
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_position() {
        let err = serde_json::from_str::<serde_json::Value>("{\"conceptSets\": [")
            .expect_err("truncated JSON");
        let err = ValidatorError::parse(&err);

        match &err {
            ValidatorError::Parse { position, .. } => {
                let position = position.expect("position");
                assert_eq!(position.line, 1);
                assert!(position.column > 0);
            }
            other => panic!("Expected parse error, got {other:?}"),
        }
        assert!(err.to_string().contains("at line 1"));
    }

    #[test]
    fn configuration_error_names_path() {
        let err = ValidatorError::configuration(
            "/opt/circe/circe.jar",
            "engine jar not found",
            "run the engine build first",
        );
        let text = err.to_string();
        assert!(text.contains("/opt/circe/circe.jar"));
        assert!(text.contains("run the engine build first"));
    }

    #[test]
    fn reported_engine_fault_keeps_engine_message() {
        let err = ValidatorError::engine(EngineFault::Reported {
            message: "Unrecognized field \"foo\"".to_string(),
            cause: Some("UnrecognizedPropertyException".to_string()),
        });
        match err {
            ValidatorError::EngineValidation { message, .. } => {
                assert_eq!(message, "Unrecognized field \"foo\"");
            }
            other => panic!("Expected engine error, got {other:?}"),
        }
    }
}
