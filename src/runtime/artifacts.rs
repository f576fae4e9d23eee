//! Engine artifact discovery and classpath construction

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::EngineSettings;
use crate::error::{Result, ValidatorError};

const BUILD_HINT: &str = "run the engine build (mvn package) first or pass --jar-path";
const DEPS_HINT: &str = "run the engine build (mvn package) first or pass --deps-path";

/// The engine jar plus its dependency jars, in classpath order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineArtifacts {
    pub jar: PathBuf,
    pub dependencies: Vec<PathBuf>,
}

impl EngineArtifacts {
    /// Locate the artifacts described by `settings`.
    ///
    /// The jar is required. An explicitly configured dependency directory is
    /// required too; the conventional one is optional.
    pub fn locate(settings: &EngineSettings) -> Result<Self> {
        let jar = settings.resolved_jar();
        log::debug!("Looking for engine jar at {}", jar.display());
        if !jar.is_file() {
            return Err(ValidatorError::configuration(
                jar,
                "engine jar not found",
                BUILD_HINT,
            ));
        }

        let deps_dir = settings.resolved_deps();
        let dependencies = if deps_dir.is_dir() {
            list_jars(&deps_dir)?
        } else if settings.deps_path.is_some() {
            return Err(ValidatorError::configuration(
                deps_dir,
                "engine dependencies directory not found",
                DEPS_HINT,
            ));
        } else {
            log::warn!(
                "Engine dependencies directory {} not found, using the jar alone",
                deps_dir.display()
            );
            Vec::new()
        };

        log::debug!(
            "Found engine jar {} with {} dependencies",
            jar.display(),
            dependencies.len()
        );
        Ok(Self { jar, dependencies })
    }

    /// Platform classpath string: the jar first, then the dependencies
    pub fn classpath(&self) -> Result<OsString> {
        let entries = std::iter::once(&self.jar).chain(self.dependencies.iter());
        std::env::join_paths(entries).map_err(|e| {
            ValidatorError::configuration(
                self.jar.clone(),
                format!("cannot build engine classpath: {e}"),
                "move the engine artifacts to paths without the path separator",
            )
        })
    }
}

/// All `*.jar` files directly inside `dir`, sorted by file name
fn list_jars(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        ValidatorError::configuration(
            dir,
            format!("cannot read engine dependencies directory: {e}"),
            DEPS_HINT,
        )
    })?;

    let mut jars: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("jar"))
        .collect();
    jars.sort();
    Ok(jars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::write(path, b"").expect("write file");
    }

    #[test]
    fn missing_jar_names_expected_path() {
        let dir = TempDir::new().expect("temp dir");
        let jar = dir.path().join("circe.jar");
        let settings = EngineSettings {
            jar_path: Some(jar.clone()),
            ..Default::default()
        };

        match EngineArtifacts::locate(&settings) {
            Err(ValidatorError::Configuration { path, hint, .. }) => {
                assert_eq!(path, jar);
                assert!(hint.contains("build"));
            }
            other => panic!("Expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn lists_only_jars_in_name_order() {
        let dir = TempDir::new().expect("temp dir");
        let jar = dir.path().join("circe.jar");
        touch(&jar);
        let deps = dir.path().join("deps");
        fs::create_dir(&deps).expect("deps dir");
        touch(&deps.join("jackson-databind.jar"));
        touch(&deps.join("commons-lang3.jar"));
        touch(&deps.join("README.txt"));

        let settings = EngineSettings {
            jar_path: Some(jar.clone()),
            deps_path: Some(deps.clone()),
            ..Default::default()
        };
        let artifacts = EngineArtifacts::locate(&settings).expect("artifacts");
        assert_eq!(artifacts.jar, jar);
        assert_eq!(
            artifacts.dependencies,
            vec![deps.join("commons-lang3.jar"), deps.join("jackson-databind.jar")]
        );

        let classpath = artifacts.classpath().expect("classpath");
        let parts: Vec<PathBuf> = std::env::split_paths(&classpath).collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], jar);
    }

    #[test]
    fn explicit_missing_deps_dir_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let jar = dir.path().join("circe.jar");
        touch(&jar);
        let settings = EngineSettings {
            jar_path: Some(jar),
            deps_path: Some(dir.path().join("nowhere")),
            ..Default::default()
        };
        assert!(matches!(
            EngineArtifacts::locate(&settings),
            Err(ValidatorError::Configuration { .. })
        ));
    }
}
