//! The lifecycle contract every plugin implements.

use crate::abi::{HostContext, LogLevel};
use crate::VariantMap;
use std::ffi::c_void;
use std::path::{Path, PathBuf};

/// Host information available to a plugin while it is being created.
///
/// This is an owned copy of the [`HostContext`] the host passed in, so it can
/// be kept by the application for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginContext {
    plugin_name: String,
    log_level: LogLevel,
    quiet: bool,
    log_directory: PathBuf,
    graphics_api: Option<String>,
}

impl PluginContext {
    /// Creates a context with host defaults: `info` level, not quiet, logs in
    /// the working directory.
    pub fn new(plugin_name: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            log_level: LogLevel::Info,
            quiet: false,
            log_directory: PathBuf::from("."),
            graphics_api: None,
        }
    }

    /// Copies the relevant parts of a host context.
    ///
    /// # Safety
    ///
    /// `host` must be null or point to a valid [`HostContext`] whose string
    /// pointers are null or NUL-terminated.
    pub unsafe fn from_host(plugin_name: &str, host: *const HostContext) -> Self {
        let mut context = Self::new(plugin_name);
        if let Some(host) = host.as_ref() {
            context.log_level = host.level();
            context.quiet = host.quiet;
            if let Some(dir) = host.log_directory().filter(|dir| !dir.is_empty()) {
                context.log_directory = PathBuf::from(dir);
            }
            context.graphics_api = host.graphics_api().filter(|api| !api.is_empty());
        }
        context
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_log_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.log_directory = directory.into();
        self
    }

    pub fn with_graphics_api(mut self, api: impl Into<String>) -> Self {
        self.graphics_api = Some(api.into());
        self
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn log_directory(&self) -> &Path {
        &self.log_directory
    }

    /// Path of this plugin's private log file.
    pub fn log_file(&self) -> PathBuf {
        self.log_directory.join(format!("{}.log", self.plugin_name))
    }

    /// Graphics API the host renders with, when it reported one.
    pub fn graphics_api(&self) -> Option<&str> {
        self.graphics_api.as_deref()
    }
}

/// Native application object of a plugin.
///
/// The host calls these hooks through the exports generated by
/// [`define_plugin_application!`](crate::define_plugin_application). All of
/// them run on the host's main thread, inside the plugin's private log scope.
/// The host never sees failures: a hook that cannot do its job must handle
/// the problem itself.
pub trait PluginApplication: 'static {
    /// Builds the application when the plugin is loaded.
    fn create(context: &PluginContext) -> Self
    where
        Self: Sized;

    /// Called once before the host starts. Insert entries into `parameters`
    /// to ask the host to reinitialize the engine with them.
    fn setup(&mut self, _parameters: &mut VariantMap) {}

    /// Called when the host starts, or right after loading when the plugin is
    /// loaded at runtime with `force_to_start`.
    fn start(&mut self) {}

    /// Called when the host stops, or before unloading with `force_to_stop`.
    fn stop(&mut self) {}

    /// Called when the host creates a script engine. `script_type_name` is
    /// `"AngelScript"` or `"Lua"`; `script_context` is opaque to the plugin
    /// unless it knows the host's script bridge.
    fn on_script_binding(&mut self, _script_type_name: &str, _script_context: *mut c_void) {}
}
