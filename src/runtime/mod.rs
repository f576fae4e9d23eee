//! Runtime Bridge
//!
//! Engine lifecycle, artifact discovery, and the JVM process that hosts the
//! checker.

pub mod artifacts;
pub mod engine;
pub mod manager;
pub mod process;

pub use artifacts::EngineArtifacts;
pub use engine::{Engine, EngineFault, EngineLauncher, RawIssue};
pub use manager::{RuntimeHandle, RuntimeManager, RuntimeState};
pub use process::{JvmEngine, JvmLauncher};
