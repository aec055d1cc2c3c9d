//! # Player Plugin API
//!
//! Everything a native plugin needs to be loadable by the player's plugin
//! registry, and everything the registry needs to talk to such a plugin.
//!
//! ## Writing a plugin
//!
//! 1. Build the crate as a `cdylib`.
//! 2. Implement [`PluginApplication`] for one type. Every lifecycle hook has an
//!    empty default body, so only `create` is mandatory.
//! 3. Invoke [`define_plugin_application!`] once with that type and the
//!    compatibility lists the plugin accepts.
//!
//! ```rust,ignore
//! use plugin_api::*;
//!
//! struct Hud;
//!
//! impl PluginApplication for Hud {
//!     fn create(_context: &PluginContext) -> Self {
//!         tracing::info!("HUD plugin created");
//!         Hud
//!     }
//!
//!     fn start(&mut self) {
//!         tracing::info!("HUD plugin started");
//!     }
//! }
//!
//! define_plugin_application!(Hud,
//!     engine_version: [ENGINE_VERSION],
//!     compiler_id: [COMPILER_ID],
//!     compiler_version: [COMPILER_VERSION],
//!     os_version: [],
//!     graphics_api: ["OpenGL", "Vulkan"],
//! );
//! ```
//!
//! ## Compatibility lists
//!
//! Each axis is exported as a `;`-joined list of accepted host values. An
//! empty list accepts any host. Matching is exact string equality.
//!
//! ## Logging
//!
//! A plugin never shares the host's tracing subscriber. Each application gets
//! a private [`PluginLog`] that copies the host's level and quiet mode, writes
//! to `<plugin>.log` in the host's log directory, and is scoped around every
//! lifecycle call, so plain `tracing` macros inside a plugin land there.

pub mod abi;
pub mod application;
pub mod export;
pub mod log;
mod macros;

pub use abi::{
    symbols, CompatibilityFn, CreateApplicationFn, DestroyApplicationFn, HostContext, LogLevel,
    ScriptBindingFn, SetupFn, StartFn, StopFn,
};
pub use application::{PluginApplication, PluginContext};
pub use log::PluginLog;

/// Parameter map handed to every plugin's `setup` hook.
///
/// Plugins insert engine parameters they want the host to reinitialize with.
///
/// The map crosses the library boundary as a plain pointer, so its memory
/// layout must be identical on both sides: host and plugins have to resolve
/// the same `serde_json` version with the same feature set (in particular
/// `preserve_order`). No compatibility axis checks this. Build plugins in the
/// host's workspace, against one lock file, and bump this crate's version
/// (reported as [`ENGINE_VERSION`]) whenever the `serde_json` requirement
/// changes so that stale plugins are rejected.
pub type VariantMap = serde_json::Map<String, serde_json::Value>;

/// Engine version reported by hosts built against this crate.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compiler identity reported by hosts built against this crate.
pub const COMPILER_ID: &str = "rustc";

/// Compiler version detected by the build script, or `"unknown"`.
pub const COMPILER_VERSION: &str = env!("PLUGIN_API_RUSTC_VERSION");

/// Returns a one-line description of the API build.
pub fn plugin_api_build_info() -> String {
    format!(
        "Player Plugin API v{} built with {} {}",
        ENGINE_VERSION, COMPILER_ID, COMPILER_VERSION
    )
}

#[doc(hidden)]
pub mod __private {
    pub use const_format;
}
