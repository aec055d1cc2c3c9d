//! The player's answers to the plugin loader's host questions.

use crate::config::AppConfig;
use plugin_api::LogLevel;
use plugin_system::HostServices;
use std::path::PathBuf;
use sysinfo::System;

/// Host values captured from the configuration at startup.
#[derive(Debug, Clone)]
pub struct PlayerHost {
    os_version: String,
    graphics_api: String,
    log_level: LogLevel,
    quiet: bool,
    log_directory: PathBuf,
}

impl PlayerHost {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            os_version: detect_os_version(),
            graphics_api: config.graphics.api.clone(),
            log_level: config.log_level(),
            quiet: config.logging.quiet,
            log_directory: PathBuf::from(&config.logging.directory),
        }
    }
}

impl HostServices for PlayerHost {
    fn os_version(&self) -> String {
        self.os_version.clone()
    }

    fn graphics_api(&self) -> String {
        self.graphics_api.clone()
    }

    fn log_level(&self) -> LogLevel {
        self.log_level
    }

    fn quiet(&self) -> bool {
        self.quiet
    }

    fn log_directory(&self) -> PathBuf {
        self.log_directory.clone()
    }
}

/// OS version as reported by the operating system, or `"unknown"`.
pub fn detect_os_version() -> String {
    System::os_version()
        .filter(|version| !version.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
