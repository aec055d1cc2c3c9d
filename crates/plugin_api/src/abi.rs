//! Binary contract between the host and a plugin library.
//!
//! Every type here crosses the dynamic-library boundary. Function pointer
//! aliases describe the exported entry points, [`symbols`] names them, and
//! [`HostContext`] is the only structure the host hands to a plugin.

use crate::VariantMap;
use std::ffi::{c_char, c_void, CStr};
use std::fmt;
use std::str::FromStr;

/// Exported symbol names, in the order the loader resolves them.
pub mod symbols {
    pub const GET_ENGINE_VERSION: &str = "GetUrhoCompatibleVersion";
    pub const GET_COMPILER_ID: &str = "GetCompatibleCompilatorName";
    pub const GET_COMPILER_VERSION: &str = "GetCompatibleCompilatorVersion";
    pub const GET_OS_VERSION: &str = "GetCompatibleOSVersion";
    pub const GET_GRAPHICS_API: &str = "GetCompatibleGraphicAPI";

    pub const CREATE_APPLICATION: &str = "CreatePluginApplication";
    pub const DESTROY_APPLICATION: &str = "DestroyPluginApplication";
    pub const SETUP: &str = "Setup";
    pub const START: &str = "Start";
    pub const STOP: &str = "Stop";
    pub const ON_SCRIPT_BINDING: &str = "OnScriptBinding";

    /// Compatibility accessors, resolved and checked first.
    pub const COMPATIBILITY: [&str; 5] = [
        GET_ENGINE_VERSION,
        GET_COMPILER_ID,
        GET_COMPILER_VERSION,
        GET_OS_VERSION,
        GET_GRAPHICS_API,
    ];

    /// Lifecycle entry points, resolved after every compatibility check passed.
    pub const LIFECYCLE: [&str; 6] = [
        CREATE_APPLICATION,
        DESTROY_APPLICATION,
        SETUP,
        START,
        STOP,
        ON_SCRIPT_BINDING,
    ];

    /// Every export a loadable plugin must provide.
    pub const REQUIRED: [&str; 11] = [
        GET_ENGINE_VERSION,
        GET_COMPILER_ID,
        GET_COMPILER_VERSION,
        GET_OS_VERSION,
        GET_GRAPHICS_API,
        CREATE_APPLICATION,
        DESTROY_APPLICATION,
        SETUP,
        START,
        STOP,
        ON_SCRIPT_BINDING,
    ];
}

/// Returns the `;`-joined list of host values a plugin accepts on one axis.
pub type CompatibilityFn = unsafe extern "C" fn() -> *const c_char;
/// Builds the plugin application and returns its opaque state, or null.
pub type CreateApplicationFn = unsafe extern "C" fn(*const HostContext) -> *mut c_void;
/// Destroys the state returned by [`CreateApplicationFn`].
pub type DestroyApplicationFn = unsafe extern "C" fn(*const HostContext, *mut c_void);
/// The map is passed by pointer, so host and plugin must agree on its layout.
/// See [`VariantMap`](crate::VariantMap).
pub type SetupFn = unsafe extern "C" fn(*mut c_void, *mut VariantMap);
pub type StartFn = unsafe extern "C" fn(*mut c_void);
pub type StopFn = unsafe extern "C" fn(*mut c_void);
/// Receives the script type name and the script engine's context pointer.
pub type ScriptBindingFn = unsafe extern "C" fn(*mut c_void, *const c_char, *mut c_void);

/// Log verbosity shared between the host and its plugins.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Decodes the raw level carried by [`HostContext`]. Unknown values map to `Info`.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            3 => LogLevel::Warn,
            4 => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn to_level_filter(self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Snapshot of host state passed to `CreatePluginApplication` and
/// `DestroyPluginApplication`.
///
/// String pointers are NUL-terminated and only valid for the duration of the
/// call; a plugin must copy whatever it wants to keep.
#[repr(C)]
#[derive(Debug)]
pub struct HostContext {
    /// Raw [`LogLevel`] of the host log.
    pub log_level: u8,
    /// Whether the host log is silenced on standard output.
    pub quiet: bool,
    /// Directory plugin log files are created in. May be null.
    pub log_directory: *const c_char,
    /// Name of the host's active graphics API. May be null.
    pub graphics_api: *const c_char,
}

impl HostContext {
    pub fn level(&self) -> LogLevel {
        LogLevel::from_raw(self.log_level)
    }

    /// # Safety
    ///
    /// `log_directory` must be null or point to a valid NUL-terminated string.
    pub unsafe fn log_directory(&self) -> Option<String> {
        read_c_string(self.log_directory)
    }

    /// # Safety
    ///
    /// `graphics_api` must be null or point to a valid NUL-terminated string.
    pub unsafe fn graphics_api(&self) -> Option<String> {
        read_c_string(self.graphics_api)
    }
}

/// Copies a possibly-null C string, replacing invalid UTF-8.
///
/// # Safety
///
/// `ptr` must be null or point to a valid NUL-terminated string.
pub unsafe fn read_c_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}
