//! Configuration management for process-scout.
//!
//! This module handles loading the configuration file and applying defaults.
//! YAML is the primary format; JSON and TOML are accepted by file extension.

use crate::error::ConfigError;
use crate::process::ProcessCategory;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

// Default configuration constants
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_LISTEN_ADDRESS: &str = ":9001";
pub const DEFAULT_INCLUDE_TYPES: [&str; 2] = ["java", "python"];

/// Host used when the listen address only names a port (`:9001`).
const ANY_HOST: &str = "0.0.0.0";

/// Optional per-process labels, in canonical order.
///
/// The declaration order is the order in which label names are registered and
/// label values are produced; the metrics library matches them positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LabelKind {
    Cwd,
    ProcessName,
    Type,
    User,
}

impl LabelKind {
    pub const ALL: [LabelKind; 4] = [
        LabelKind::Cwd,
        LabelKind::ProcessName,
        LabelKind::Type,
        LabelKind::User,
    ];

    /// Prometheus label name.
    pub fn name(self) -> &'static str {
        match self {
            LabelKind::Cwd => "cwd",
            LabelKind::ProcessName => "process_name",
            LabelKind::Type => "type",
            LabelKind::User => "user",
        }
    }
}

/// Label toggles from the `labels:` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub cwd: bool,
    pub process_name: bool,
    #[serde(rename = "type")]
    pub process_type: bool,
    pub user: bool,
}

impl LabelConfig {
    pub fn is_enabled(&self, kind: LabelKind) -> bool {
        match kind {
            LabelKind::Cwd => self.cwd,
            LabelKind::ProcessName => self.process_name,
            LabelKind::Type => self.process_type,
            LabelKind::User => self.user,
        }
    }
}

/// Exporter configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `host:port` to listen on; `:port` binds all IPv4 interfaces.
    pub listen_address: String,
    /// Process categories to export. Order is irrelevant.
    pub include_types: Vec<String>,
    pub labels: LabelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS.to_string(),
            include_types: DEFAULT_INCLUDE_TYPES.iter().map(|s| s.to_string()).collect(),
            labels: LabelConfig::default(),
        }
    }
}

impl Config {
    /// Fills in defaults for values that were present but empty.
    pub fn apply_defaults(&mut self) {
        if self.listen_address.trim().is_empty() {
            self.listen_address = DEFAULT_LISTEN_ADDRESS.to_string();
        }
        if self.include_types.is_empty() {
            self.include_types = DEFAULT_INCLUDE_TYPES.iter().map(|s| s.to_string()).collect();
        }
    }

    /// Address handed to the socket layer.
    pub fn bind_address(&self) -> String {
        let addr = self.listen_address.trim();
        if addr.starts_with(':') {
            format!("{ANY_HOST}{addr}")
        } else {
            addr.to_string()
        }
    }

    /// Whether processes of this category are exported.
    pub fn includes(&self, category: ProcessCategory) -> bool {
        self.include_types
            .iter()
            .any(|t| t.as_str() == category.as_str())
    }

    /// Enabled labels in canonical order.
    pub fn enabled_labels(&self) -> Vec<LabelKind> {
        LabelKind::ALL
            .into_iter()
            .filter(|kind| self.labels.is_enabled(*kind))
            .collect()
    }

    pub fn label_names(&self) -> Vec<&'static str> {
        self.enabled_labels().into_iter().map(LabelKind::name).collect()
    }
}

/// Loads configuration from `path`, choosing the parser by file extension.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut config = parse_config(path, &content)?;
    config.apply_defaults();

    info!(
        "Loaded configuration from {} (include_types={:?}, labels={:?})",
        path.display(),
        config.include_types,
        config.label_names()
    );
    Ok(config)
}

fn parse_config(path: &Path, content: &str) -> Result<Config, ConfigError> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Some("toml") => toml::from_str(content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        }),
        // Default to YAML
        _ => serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}
