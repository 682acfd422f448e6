//! Configuration management for `modload`.
//!
//! Settings come from an optional TOML file; command-line flags are applied on
//! top of it with [`AppConfig::apply_cli`].

use crate::cli::CliArgs;
use anyhow::Context;
use module_loader::DEFAULT_MODULE_PATH_VAR;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Module scan settings
    #[serde(default)]
    pub loader: LoaderSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Controls where modules are looked up and how deep the walk goes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderSettings {
    /// Environment variable holding the module path list
    #[serde(default = "default_env_var")]
    pub env_var: String,
    /// Maximum directory depth below each listed path (unset means no limit)
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Walk without loading
    #[serde(default)]
    pub dry_run: bool,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

fn default_env_var() -> String {
    DEFAULT_MODULE_PATH_VAR.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            env_var: default_env_var(),
            max_depth: None,
            dry_run: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// A missing file is not an error: the defaults are returned and nothing
    /// is written to disk.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Applies command-line overrides on top of the file settings.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(env_var) = &args.env_var {
            self.loader.env_var = env_var.clone();
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if args.max_depth.is_some() {
            self.loader.max_depth = args.max_depth;
        }
        if args.json_logs {
            self.logging.json_format = true;
        }
        if args.dry_run {
            self.loader.dry_run = true;
        }
    }

    /// Validates the configuration for consistency and correctness.
    pub fn validate(&self) -> Result<(), String> {
        let var = &self.loader.env_var;
        if var.is_empty() {
            return Err("Module path variable name cannot be empty".to_string());
        }
        if var.contains('=') || var.contains('\0') {
            return Err(format!("Invalid module path variable name: {var:?}"));
        }

        if !VALID_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {VALID_LEVELS:?}",
                &self.logging.level
            ));
        }

        Ok(())
    }
}
