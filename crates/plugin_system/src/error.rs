//! Error types for the plugin system.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginSystemError {
    #[error("Failed to open plugin library {path}: {reason}")]
    LibraryNotFound { path: PathBuf, reason: String },

    #[error("Plugin library {path} does not export '{symbol}'")]
    MissingExport { symbol: &'static str, path: PathBuf },

    #[error(
        "Plugin '{plugin}' is incompatible: host {host_accessor}() reports '{host_value}' \
         but {plugin_accessor}() accepts '{declared}'"
    )]
    Incompatible {
        plugin: String,
        host_accessor: &'static str,
        plugin_accessor: &'static str,
        host_value: String,
        declared: String,
    },

    #[error("Plugin '{plugin}' returned a null string from {symbol}()")]
    InvalidCompatibilityString { plugin: String, symbol: &'static str },

    #[error("Plugin '{0}' failed to create its application")]
    CreationFailed(String),

    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure of a script call routed through [`ScriptPluginApi::invoke`](crate::ScriptPluginApi::invoke).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptCallError {
    #[error("PluginManager has no member '{0}'")]
    UnknownMember(String),

    #[error("Argument {index} of PluginManager.{member} must be {expected}")]
    BadArgument {
        member: String,
        index: usize,
        expected: &'static str,
    },
}
