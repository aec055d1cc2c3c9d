//! Configuration management for the player.
//!
//! This module handles loading and validation of the player configuration
//! from TOML files, and folds plugin-provided engine parameters back into it.

use plugin_api::{LogLevel, VariantMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Plugin loading settings
    pub plugins: PluginSettings,
    /// Logging configuration settings
    pub logging: LoggingSettings,
    /// Graphics settings reported to plugins
    #[serde(default)]
    pub graphics: GraphicsSettings,
    /// Engine parameters; plugins may add to them during setup
    #[serde(default)]
    pub engine: BTreeMap<String, toml::Value>,
}

/// Plugin system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Directory scanned for plugin libraries
    pub directory: String,
    /// Whether to load every plugin found in `directory` on startup
    pub auto_load: bool,
    /// Plugin whitelist - if non-empty, only these discovered plugins are loaded
    pub whitelist: Vec<String>,
    /// Plugins always loaded on startup, before discovered ones
    #[serde(default)]
    pub preload: Vec<String>,
}

/// Logging system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Whether to output logs in JSON format
    pub json_format: bool,
    /// Whether to keep log output off standard output
    #[serde(default)]
    pub quiet: bool,
    /// Directory where each plugin writes `<plugin>.log`
    #[serde(default = "default_log_directory")]
    pub directory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsSettings {
    /// Name of the active graphics API
    #[serde(default = "default_graphics_api")]
    pub api: String,
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_graphics_api() -> String {
    "OpenGL".to_string()
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            api: default_graphics_api(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut engine = BTreeMap::new();
        engine.insert("WindowTitle".to_string(), toml::Value::from("Player"));
        engine.insert("FullScreen".to_string(), toml::Value::from(false));

        Self {
            plugins: PluginSettings {
                directory: "plugins".to_string(),
                auto_load: false,
                whitelist: Vec::new(),
                preload: Vec::new(),
            },
            logging: LoggingSettings {
                level: "info".to_string(),
                json_format: false,
                quiet: false,
                directory: default_log_directory(),
            },
            graphics: GraphicsSettings::default(),
            engine,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file, creating a default one when the
    /// file does not exist.
    pub async fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if path.exists() {
            let content = tokio::fs::read_to_string(path).await?;
            let config: AppConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config)?;
            tokio::fs::write(path, toml_content).await?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.plugins.directory.is_empty() {
            return Err("Plugin directory cannot be empty".to_string());
        }

        if self.logging.level.parse::<LogLevel>().is_err() {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        if self.logging.directory.is_empty() {
            return Err("Log directory cannot be empty".to_string());
        }

        if self.graphics.api.trim().is_empty() {
            return Err("Graphics API name cannot be empty".to_string());
        }

        Ok(())
    }

    /// Log level for the host and, through the host context, for plugins.
    pub fn log_level(&self) -> LogLevel {
        self.logging.level.parse().unwrap_or_default()
    }

    /// Merges parameters returned by plugin setup into `[engine]`.
    ///
    /// Values TOML cannot hold (nulls, out-of-range integers) are skipped with
    /// a warning. Returns how many entries were merged.
    pub fn merge_engine_parameters(&mut self, parameters: &VariantMap) -> usize {
        let mut merged = 0;
        for (name, value) in parameters {
            if value.is_null() {
                warn!("Ignoring engine parameter {} with a null value", name);
                continue;
            }

            match toml::Value::try_from(value) {
                Ok(value) => {
                    self.engine.insert(name.clone(), value);
                    merged += 1;
                }
                Err(e) => warn!("Ignoring engine parameter {}: {}", name, e),
            }
        }
        merged
    }
}
