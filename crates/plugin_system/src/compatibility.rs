//! The compatibility rule shared by every axis.
//!
//! A plugin declares, per axis, a `;`-joined list of host values it accepts.
//! An empty list is a wildcard; otherwise the host value must be one of the
//! entries verbatim.

use plugin_api::symbols;
use serde::Serialize;
use std::fmt;

/// One of the five axes a plugin is checked against, in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompatibilityAxis {
    EngineVersion,
    CompilerId,
    CompilerVersion,
    OsVersion,
    GraphicsApi,
}

impl CompatibilityAxis {
    pub const ALL: [CompatibilityAxis; 5] = [
        CompatibilityAxis::EngineVersion,
        CompatibilityAxis::CompilerId,
        CompatibilityAxis::CompilerVersion,
        CompatibilityAxis::OsVersion,
        CompatibilityAxis::GraphicsApi,
    ];

    /// Name of the accessor the plugin exports for this axis.
    pub fn plugin_symbol(self) -> &'static str {
        match self {
            CompatibilityAxis::EngineVersion => symbols::GET_ENGINE_VERSION,
            CompatibilityAxis::CompilerId => symbols::GET_COMPILER_ID,
            CompatibilityAxis::CompilerVersion => symbols::GET_COMPILER_VERSION,
            CompatibilityAxis::OsVersion => symbols::GET_OS_VERSION,
            CompatibilityAxis::GraphicsApi => symbols::GET_GRAPHICS_API,
        }
    }

    /// Name of the host accessor whose value is compared.
    pub fn host_accessor(self) -> &'static str {
        match self {
            CompatibilityAxis::EngineVersion => "GetEngineVersion",
            CompatibilityAxis::CompilerId => "GetCompilerId",
            CompatibilityAxis::CompilerVersion => "GetCompilerVersion",
            CompatibilityAxis::OsVersion => "GetOsVersion",
            CompatibilityAxis::GraphicsApi => "GetGraphicsApiName",
        }
    }
}

impl fmt::Display for CompatibilityAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompatibilityAxis::EngineVersion => "engine version",
            CompatibilityAxis::CompilerId => "compiler id",
            CompatibilityAxis::CompilerVersion => "compiler version",
            CompatibilityAxis::OsVersion => "OS version",
            CompatibilityAxis::GraphicsApi => "graphics API",
        };
        f.write_str(name)
    }
}

/// Splits a declared list on `;`, dropping empty entries.
pub fn parse_declared(declared: &str) -> Vec<&str> {
    declared.split(';').filter(|value| !value.is_empty()).collect()
}

/// True when `declared` is empty or contains `host` verbatim.
pub fn is_compatible(declared: &[&str], host: &str) -> bool {
    declared.is_empty() || declared.contains(&host)
}

/// Everything a loaded plugin declared, kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompatibilityDescriptor {
    pub engine_version: Vec<String>,
    pub compiler_id: Vec<String>,
    pub compiler_version: Vec<String>,
    pub os_version: Vec<String>,
    pub graphics_api: Vec<String>,
}

impl CompatibilityDescriptor {
    pub fn axis(&self, axis: CompatibilityAxis) -> &[String] {
        match axis {
            CompatibilityAxis::EngineVersion => &self.engine_version,
            CompatibilityAxis::CompilerId => &self.compiler_id,
            CompatibilityAxis::CompilerVersion => &self.compiler_version,
            CompatibilityAxis::OsVersion => &self.os_version,
            CompatibilityAxis::GraphicsApi => &self.graphics_api,
        }
    }

    pub(crate) fn set_axis(&mut self, axis: CompatibilityAxis, values: Vec<String>) {
        let slot = match axis {
            CompatibilityAxis::EngineVersion => &mut self.engine_version,
            CompatibilityAxis::CompilerId => &mut self.compiler_id,
            CompatibilityAxis::CompilerVersion => &mut self.compiler_version,
            CompatibilityAxis::OsVersion => &mut self.os_version,
            CompatibilityAxis::GraphicsApi => &mut self.graphics_api,
        };
        *slot = values;
    }

    /// True when the plugin accepts any host on `axis`.
    pub fn is_wildcard(&self, axis: CompatibilityAxis) -> bool {
        self.axis(axis).is_empty()
    }
}
