use std::process::ExitCode;

use cohort_validator::cli::{self, EXIT_CONFIGURATION, EXIT_INVALID, EXIT_VALID};
use cohort_validator::config::Config;

fn main() -> ExitCode {
    // Parse configuration from command line and config file
    let config = match Config::from_args_and_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(EXIT_CONFIGURATION);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    if let Some(path) = &config.config_path {
        log::debug!("Loaded configuration from {}", path.display());
    }

    match cli::run(&config) {
        Ok(true) => ExitCode::from(EXIT_VALID),
        Ok(false) => ExitCode::from(EXIT_INVALID),
        Err(e) => {
            log::debug!("Validation failed: {:?}", e);
            eprintln!("Error: {e:#}");
            ExitCode::from(cli::exit_code(&e))
        }
    }
}
