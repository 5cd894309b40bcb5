//! Miette diagnostic conversion for CLI errors.

use miette::Report;
use wcb_config::ConfigError;

use crate::error::CliError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        // wcb_bundler::Error implements Diagnostic with codes and help
        CliError::Build(e) => Report::new(e),
        CliError::Config(e) => config_error_to_miette(e),
        CliError::FileNotFound(path) => miette::miette!(
            code = "FILE_NOT_FOUND",
            "File not found: {}",
            path.display()
        ),
        CliError::Watch(e) => miette::miette!(
            code = "WATCH_ERROR",
            help = "Check that the source directory exists and is readable.",
            "File watcher error: {}",
            e
        ),
        other => miette::miette!("{}", other),
    }
}

/// Convert a configuration error to a miette Report
pub fn config_error_to_miette(err: ConfigError) -> Report {
    match &err {
        ConfigError::UnsupportedFormat(_) => miette::miette!(
            code = "CONFIG_FORMAT",
            help = "Use a .toml or .json configuration file.",
            "{}",
            err
        ),
        ConfigError::InvalidValue { .. } => miette::miette!(
            code = "CONFIG_INVALID",
            help = "Fix the value in your configuration file or WCB_* environment variables.",
            "{}",
            err
        ),
        ConfigError::Load { .. } => miette::miette!(
            code = "CONFIG_LOAD",
            help = "Check the file syntax and field names. Unknown fields are rejected.",
            "{}",
            err
        ),
        ConfigError::Io(_) => miette::miette!(code = "CONFIG_IO", "{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_bundler_errors_keep_their_code() {
        let report = cli_error_to_miette(CliError::Build(wcb_bundler::Error::InvalidConfig(
            "nope".to_string(),
        )));
        let code = report.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("INVALID_CONFIG"));
    }

    #[test]
    fn test_config_errors_carry_help() {
        let report = config_error_to_miette(ConfigError::UnsupportedFormat(PathBuf::from(
            "wcb.yaml",
        )));
        assert!(report.help().is_some());
        assert!(report.to_string().contains("wcb.yaml"));
    }

    #[test]
    fn test_hinted_errors_keep_message() {
        let report = cli_error_to_miette(CliError::Custom(
            "File not found: styles\n\nHint: create it".to_string(),
        ));
        assert!(report.to_string().ends_with("Hint: create it"));
    }
}
