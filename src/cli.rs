//! CLI arguments for process-scout.
//!
//! This module defines the command-line interface structure using the clap library.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

use crate::config::DEFAULT_CONFIG_PATH;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Maximum tracing level, or `None` to disable logging.
    pub fn to_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "process-scout",
    about = "Prometheus exporter for per-process CPU and memory metrics",
    long_about = "Prometheus exporter for per-process CPU and memory metrics.\n\n\
                  Classifies processes as java, python, node, docker, docker_app or system \
                  and exports resident memory and CPU usage for the configured categories, \
                  together with host-wide memory and CPU core gauges.",
    version
)]
pub struct Args {
    /// Path to the config file (YAML, or JSON/TOML by extension)
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["process-scout"]);
        assert_eq!(args.config, PathBuf::from("config.yaml"));
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(!args.check_config);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "process-scout",
            "--config",
            "/etc/process-scout/config.yaml",
            "--log-level",
            "debug",
            "--check-config",
        ]);
        assert_eq!(args.config, PathBuf::from("/etc/process-scout/config.yaml"));
        assert_eq!(args.log_level.to_level(), Some(Level::DEBUG));
        assert!(args.check_config);
    }

    #[test]
    fn test_log_level_off() {
        assert_eq!(LogLevel::Off.to_level(), None);
    }

    #[test]
    fn test_rejects_unknown_flag() {
        assert!(Args::try_parse_from(["process-scout", "--port", "9000"]).is_err());
    }
}
