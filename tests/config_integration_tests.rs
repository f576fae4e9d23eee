//! Configuration file loading and precedence
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use cohort_validator::config::{Args, Config};
use cohort_validator::validation::{Category, CategoryTable};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("validator.toml");
    fs::write(&path, content).expect("write config");
    path
}

fn config_from(args: &[&str]) -> anyhow::Result<Config> {
    let mut argv = vec!["cohort-validate"];
    argv.extend_from_slice(args);
    Config::from_args(Args::parse_from(argv))
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        r#"
[engine]
jar_path = "/opt/circe/circe.jar"
deps_path = "/opt/circe/deps"
main_class = "org.example.Checker"
jvm_args = ["-Xmx2g"]
"#,
    );

    let config = config_from(&["cohort.json", "--config", path.to_str().expect("utf-8")])
        .expect("config");
    assert!(config.has_config_file());
    assert_eq!(config.config_path, Some(path));
    assert_eq!(config.engine.resolved_jar(), PathBuf::from("/opt/circe/circe.jar"));
    assert_eq!(config.engine.resolved_deps(), PathBuf::from("/opt/circe/deps"));
    assert_eq!(config.engine.resolved_main_class(), "org.example.Checker");
    assert_eq!(config.engine.jvm_args, vec!["-Xmx2g".to_string()]);
}

#[test]
fn command_line_overrides_config_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        "[engine]\njar_path = \"/from/file.jar\"\njava = \"/from/file/java\"\n",
    );

    let config = config_from(&[
        "cohort.json",
        "--config",
        path.to_str().expect("utf-8"),
        "--jar-path",
        "/from/cli.jar",
    ])
    .expect("config");
    assert_eq!(config.engine.resolved_jar(), PathBuf::from("/from/cli.jar"));
    assert_eq!(config.engine.resolved_java(), PathBuf::from("/from/file/java"));
}

#[test]
fn malformed_config_file_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "[engine]\njar_path = 42\n");

    let err = config_from(&["cohort.json", "--config", path.to_str().expect("utf-8")])
        .expect_err("bad config");
    assert!(format!("{err:#}").contains("Failed to parse config file"));
}

#[test]
fn missing_config_file_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("absent.toml");

    let err = config_from(&["cohort.json", "--config", path.to_str().expect("utf-8")])
        .expect_err("missing config");
    assert!(format!("{err:#}").contains("Failed to read config file"));
}

#[test]
fn configured_categories_take_precedence() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        r#"
[[categories]]
category = "Contradiction"
any = [["not used", "observation"]]
"#,
    );

    let config = config_from(&["cohort.json", "--config", path.to_str().expect("utf-8")])
        .expect("config");
    let table = CategoryTable::with_extra_rules(&config.categories).expect("rules");

    assert_eq!(
        table.classify("Observation concept set is not used"),
        Category::Contradiction
    );
    assert_eq!(
        table.classify("Concept set Statins is not used"),
        Category::UnusedConcept
    );
}
