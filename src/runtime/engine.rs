//! Engine seam
//!
//! The rule engine is only ever reached through [`Engine`]. Nothing foreign
//! outlives a single call: requests go in as JSON text and issues come back
//! as plain Rust records.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;

/// One issue exactly as the engine emitted it, before classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIssue {
    pub message: String,
    #[serde(default)]
    pub severity: Option<String>,
    /// Engine-side issue type (the checker's warning class name)
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl RawIssue {
    pub fn new(message: impl Into<String>, severity: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Some(severity.into()),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}

/// Failure observed at the engine boundary
#[derive(Debug, Error)]
pub enum EngineFault {
    /// The engine answered the request with an error of its own
    #[error("engine reported: {message}")]
    Reported {
        message: String,
        cause: Option<String>,
    },

    #[error("engine I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("malformed engine response: {0}")]
    Protocol(String),

    #[error("engine exited unexpectedly ({0})")]
    Exited(String),
}

/// A started rule engine.
///
/// Calls are blocking and all-or-nothing: either the full ordered issue list
/// or a fault. Implementations are not required to be reentrant; the runtime
/// handle serializes calls.
pub trait Engine: Send {
    fn check(&mut self, expression: &str) -> std::result::Result<Vec<RawIssue>, EngineFault>;

    fn shutdown(&mut self) -> std::result::Result<(), EngineFault> {
        Ok(())
    }
}

/// Brings up an [`Engine`]. Called at most once per runtime manager.
pub trait EngineLauncher: Send + Sync {
    fn launch(&self) -> Result<Box<dyn Engine>>;
}

impl<F> EngineLauncher for F
where
    F: Fn() -> Result<Box<dyn Engine>> + Send + Sync,
{
    fn launch(&self) -> Result<Box<dyn Engine>> {
        self()
    }
}
