//! Configuration management for record tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (records.toml)
//! - Environment variables (RECORDS__*)
//!
//! ## Example config file (records.toml):
//! ```toml
//! [declarations]
//! paths = ["schemas/address.toml", "schemas/orders.json"]
//!
//! [export]
//! output_format = "pretty"
//! unwrap_single_collection = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::instance::ExportOptions;

/// Main configuration for record tooling
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordsConfig {
    /// Declaration files to load
    #[serde(default)]
    pub declarations: DeclarationsConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
}

/// Declaration file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclarationsConfig {
    /// Declaration files, loaded in order (dependencies first)
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Export single-collection schemas as the bare item list
    #[serde(default = "default_true")]
    pub unwrap_single_collection: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn render(&self, value: &serde_json::Value) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Pretty,
            unwrap_single_collection: true,
        }
    }
}

impl RecordsConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering a specific file over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["records.toml", ".records.toml", "config/records.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "records") {
            let xdg_config = config_dir.config_dir().join("records.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (RECORDS__*)
        builder = builder.add_source(
            Environment::with_prefix("RECORDS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            unwrap_single_collection: self.export.unwrap_single_collection,
        }
    }

    /// Declaration paths, with relative paths resolved against the working directory
    pub fn declaration_paths(&self) -> Vec<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_default();
        self.declarations
            .paths
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { cwd.join(p) })
            .collect()
    }
}
