//! Runtime configuration.
//!
//! Values come from command-line flags, which fall back to environment
//! variables:
//! - `TASKBOARD_API_URL` - Base URL of the task API. Defaults to `http://localhost:5201`.
//! - `TASKBOARD_TIMEOUT_SECS` - Per-request timeout. Defaults to `10`.
//! - `TASKBOARD_NOTICE_SECS` - How long error notices stay on screen. Defaults to `3`.
//! - `RUST_LOG` - Log filter. Defaults to `tb=info`.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::cli::Cli;

pub const DEFAULT_API_URL: &str = "http://localhost:5201";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_NOTICE_SECS: u64 = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the task API, without a trailing slash
    pub api_url: String,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,

    /// Delay before an error notice disappears from the board
    pub notice_ttl: Duration,

    /// Where logs go while the board owns the terminal
    pub log_file: PathBuf,
}

impl Config {
    /// Build the configuration from parsed command-line arguments.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a non-HTTP API URL or a zero
    /// timeout.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let api_url = cli.api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(
                "TASKBOARD_API_URL".to_string(),
                format!("'{}' is not an http(s) URL", cli.api_url),
            ));
        }

        if cli.timeout == 0 {
            return Err(ConfigError::InvalidValue(
                "TASKBOARD_TIMEOUT_SECS".to_string(),
                "timeout must be at least 1 second".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            request_timeout: Duration::from_secs(cli.timeout),
            notice_ttl: Duration::from_secs(cli.notice_secs),
            log_file: cli.log_file.clone().unwrap_or_else(default_log_file),
        })
    }
}

fn default_log_file() -> PathBuf {
    std::env::temp_dir().join("taskboard.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["tb"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = parse(&["--api-url", "https://tasks.example.com/", "--timeout", "4", "list"]);
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.api_url, "https://tasks.example.com");
        assert_eq!(config.request_timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_cli(&parse(&["list"])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.notice_ttl, Duration::from_secs(DEFAULT_NOTICE_SECS));
        assert!(config.log_file.ends_with("taskboard.log"));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let cli = parse(&["--api-url", "localhost:5201", "list"]);
        assert!(matches!(Config::from_cli(&cli), Err(ConfigError::InvalidValue(..))));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let cli = parse(&["--timeout", "0", "list"]);
        assert!(Config::from_cli(&cli).is_err());
    }
}
