//! Public API
//!
//! [`CohortValidator`] composes the runtime, marshaler, invoker and
//! normalizer. Each validator owns its own runtime; there is no process-wide
//! engine.

use std::path::Path;

use serde::Serialize;

use crate::config::{Config, EngineSettings};
use crate::error::{Result, ValidatorError};
use crate::marshal::{self, CanonicalRequest, CohortInput};
use crate::runtime::{EngineLauncher, JvmLauncher, RuntimeHandle, RuntimeManager, RuntimeState};
use crate::validation::{self, CategoryTable, Normalizer, ValidationResult};

/// Validates cohort expressions against the rule engine.
///
/// Safe to share between threads. Engine calls are serialized; marshaling
/// and normalization are not.
pub struct CohortValidator {
    runtime: RuntimeManager,
    normalizer: Normalizer,
}

impl CohortValidator {
    /// Validator backed by the JVM checker
    pub fn new(settings: EngineSettings, categories: CategoryTable) -> Self {
        Self::with_launcher(JvmLauncher::new(settings), categories)
    }

    /// Validator for the resolved CLI/file configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let categories = CategoryTable::with_extra_rules(&config.categories)?;
        Ok(Self::new(config.engine.clone(), categories))
    }

    /// Validator backed by any engine launcher
    pub fn with_launcher(launcher: impl EngineLauncher + 'static, categories: CategoryTable) -> Self {
        Self {
            runtime: RuntimeManager::new(launcher),
            normalizer: Normalizer::new(categories),
        }
    }

    /// Start the engine now instead of on first use
    pub fn start(&self) -> Result<()> {
        self.runtime.start().map(|_| ())
    }

    /// Validate a cohort given as a JSON value, JSON text, or file path
    pub fn validate_cohort(&self, data: impl Into<CohortInput>) -> Result<ValidationResult> {
        let handle = self.runtime.start()?;
        let request = marshal::marshal(data.into())?;
        self.run(&handle, &request)
    }

    /// Validate any serializable cohort representation
    pub fn validate_cohort_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<ValidationResult> {
        let handle = self.runtime.start()?;
        let request = marshal::marshal_value(value)?;
        self.run(&handle, &request)
    }

    /// Validate the cohort stored in `path`.
    ///
    /// The file is read and checked before the engine is started. A shut
    /// down validator rejects the call without reading the file.
    pub fn validate_cohort_file(&self, path: impl AsRef<Path>) -> Result<ValidationResult> {
        if self.runtime.state() == RuntimeState::ShutDown {
            return Err(ValidatorError::RuntimeUnavailable);
        }
        let path = path.as_ref();
        log::debug!("Validating cohort file {}", path.display());
        let request = marshal::marshal_file(path)?;
        let handle = self.runtime.start()?;
        self.run(&handle, &request)
    }

    /// Shut the engine down. Idempotent; later validations fail with
    /// [`ValidatorError::RuntimeUnavailable`](crate::ValidatorError::RuntimeUnavailable).
    pub fn shutdown(&self) {
        self.runtime.shutdown();
    }

    pub fn state(&self) -> RuntimeState {
        self.runtime.state()
    }

    fn run(&self, handle: &RuntimeHandle, request: &CanonicalRequest) -> Result<ValidationResult> {
        let issues = validation::invoke(handle, request)?;
        let result = self.normalizer.normalize(issues);
        log::debug!(
            "Validation produced {} warnings and {} errors",
            result.warnings.len(),
            result.errors.len()
        );
        Ok(result)
    }
}
