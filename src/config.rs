//! Configuration management for the cohort validator.
//!
//! Handles:
//! - Command-line argument parsing
//! - The optional TOML configuration file
//! - Engine artifact locations (explicit, environment, or build convention)

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::report::OutputFormat;
use crate::validation::CategoryRuleDef;

/// Engine build output directory when `CIRCE_HOME` is not set
pub const DEFAULT_ENGINE_HOME: &str = "circe-be";
/// Jar produced by the engine build, relative to the engine home
pub const DEFAULT_JAR: &str = "target/circe-1.13.0-SNAPSHOT.jar";
/// Dependency jars copied by the engine build, relative to the engine home
pub const DEFAULT_DEPS_DIR: &str = "target/dependencies";
/// Entry point of the engine's stdio checker
pub const DEFAULT_MAIN_CLASS: &str = "org.ohdsi.circe.check.CheckerServer";

/// Project-local configuration file name
pub const PROJECT_CONFIG_FILE: &str = ".cohort-validator.toml";

/// Command-line arguments for the cohort validator
#[derive(Debug, Parser)]
#[command(name = "cohort-validate")]
#[command(about = "Validate cohort expressions using the OHDSI CIRCE checker")]
#[command(version)]
pub struct Args {
    /// Path to JSON file containing the cohort expression
    pub input_file: PathBuf,

    #[arg(short, long, help = "Output file path (default: stdout)")]
    pub output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    #[arg(long, help = "Path to the CIRCE jar (auto-detected if not provided)")]
    pub jar_path: Option<PathBuf>,

    #[arg(
        long,
        help = "Path to the CIRCE dependencies directory (auto-detected if not provided)"
    )]
    pub deps_path: Option<PathBuf>,

    #[arg(long, help = "Java executable (default: $JAVA_HOME/bin/java, then java)")]
    pub java: Option<PathBuf>,

    #[arg(long, help = "Engine entry point class")]
    pub main_class: Option<String>,

    #[arg(long, help = "Configuration file (default: .cohort-validator.toml)")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        default_value = "warn",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Where the engine lives and how to start it.
///
/// Unset fields fall back to the environment and then to the engine build
/// layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    pub jar_path: Option<PathBuf>,
    pub deps_path: Option<PathBuf>,
    pub java: Option<PathBuf>,
    pub main_class: Option<String>,
    pub jvm_args: Vec<String>,
}

impl EngineSettings {
    /// Engine build output root: `$CIRCE_HOME` or `./circe-be`
    pub fn engine_home() -> PathBuf {
        std::env::var_os("CIRCE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE_HOME))
    }

    pub fn resolved_jar(&self) -> PathBuf {
        self.jar_path
            .clone()
            .unwrap_or_else(|| Self::engine_home().join(DEFAULT_JAR))
    }

    pub fn resolved_deps(&self) -> PathBuf {
        self.deps_path
            .clone()
            .unwrap_or_else(|| Self::engine_home().join(DEFAULT_DEPS_DIR))
    }

    pub fn resolved_java(&self) -> PathBuf {
        if let Some(java) = &self.java {
            return java.clone();
        }
        match std::env::var_os("JAVA_HOME") {
            Some(home) => Path::new(&home).join("bin").join("java"),
            None => PathBuf::from("java"),
        }
    }

    pub fn resolved_main_class(&self) -> &str {
        self.main_class.as_deref().unwrap_or(DEFAULT_MAIN_CLASS)
    }

    /// Fill unset fields from `fallback`
    pub fn or(self, fallback: EngineSettings) -> Self {
        Self {
            jar_path: self.jar_path.or(fallback.jar_path),
            deps_path: self.deps_path.or(fallback.deps_path),
            java: self.java.or(fallback.java),
            main_class: self.main_class.or(fallback.main_class),
            jvm_args: if self.jvm_args.is_empty() {
                fallback.jvm_args
            } else {
                self.jvm_args
            },
        }
    }
}

/// Contents of a configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub engine: EngineSettings,
    /// Extra category rules, tried before the built-in table
    pub categories: Vec<CategoryRuleDef>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// First existing file among the project file and the user config dir
    pub fn discover() -> Option<PathBuf> {
        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        if project.is_file() {
            return Some(project);
        }
        dirs::config_dir()
            .map(|dir| dir.join("cohort-validator").join("config.toml"))
            .filter(|path| path.is_file())
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub input_file: PathBuf,
    pub output: Option<PathBuf>,
    pub format: OutputFormat,
    pub engine: EngineSettings,
    pub categories: Vec<CategoryRuleDef>,
    pub log_level: String,
    /// Configuration file that was loaded, if any
    pub config_path: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let config_path = match args.config {
            Some(path) => Some(path),
            None => ConfigFile::discover(),
        };
        let file = match &config_path {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let cli_engine = EngineSettings {
            jar_path: args.jar_path,
            deps_path: args.deps_path,
            java: args.java,
            main_class: args.main_class,
            jvm_args: Vec::new(),
        };

        Ok(Config {
            input_file: args.input_file,
            output: args.output,
            format: args.format,
            engine: cli_engine.or(file.engine),
            categories: file.categories,
            log_level: args.log_level,
            config_path,
        })
    }

    pub fn has_config_file(&self) -> bool {
        self.config_path.is_some()
    }
}
