//! Host capabilities the loader depends on.
//!
//! The registry never talks to an engine directly. Whatever embeds it
//! implements [`HostServices`] to report the values each compatibility axis is
//! compared against and the log settings plugins copy.

use crate::compatibility::CompatibilityAxis;
use plugin_api::{HostContext, LogLevel};
use std::ffi::CString;
use std::path::PathBuf;

pub trait HostServices {
    fn engine_version(&self) -> String {
        plugin_api::ENGINE_VERSION.to_string()
    }

    fn compiler_id(&self) -> String {
        plugin_api::COMPILER_ID.to_string()
    }

    fn compiler_version(&self) -> String {
        plugin_api::COMPILER_VERSION.to_string()
    }

    fn os_version(&self) -> String;

    /// Name of the active graphics subsystem's API.
    fn graphics_api(&self) -> String;

    fn log_level(&self) -> LogLevel {
        LogLevel::Info
    }

    fn quiet(&self) -> bool {
        false
    }

    fn log_directory(&self) -> PathBuf {
        PathBuf::from(".")
    }

    /// Current host value for one compatibility axis.
    fn host_value(&self, axis: CompatibilityAxis) -> String {
        match axis {
            CompatibilityAxis::EngineVersion => self.engine_version(),
            CompatibilityAxis::CompilerId => self.compiler_id(),
            CompatibilityAxis::CompilerVersion => self.compiler_version(),
            CompatibilityAxis::OsVersion => self.os_version(),
            CompatibilityAxis::GraphicsApi => self.graphics_api(),
        }
    }
}

/// A [`HostContext`] together with the strings it points into.
///
/// Keep this value alive for as long as the raw context is in use.
pub struct OwnedHostContext {
    _log_directory: CString,
    _graphics_api: CString,
    context: HostContext,
}

impl OwnedHostContext {
    pub fn capture(services: &dyn HostServices) -> Self {
        let log_directory = c_string(services.log_directory().to_string_lossy().into_owned());
        let graphics_api = c_string(services.graphics_api());
        let context = HostContext {
            log_level: services.log_level() as u8,
            quiet: services.quiet(),
            log_directory: log_directory.as_ptr(),
            graphics_api: graphics_api.as_ptr(),
        };

        Self {
            _log_directory: log_directory,
            _graphics_api: graphics_api,
            context,
        }
    }

    pub fn as_ptr(&self) -> *const HostContext {
        &self.context
    }
}

fn c_string(mut value: String) -> CString {
    value.retain(|c| c != '\0');
    CString::new(value).unwrap_or_default()
}
