//! Host-side plugin system for the player.
//!
//! Opens native plugin libraries, checks them against the host on five
//! compatibility axes, resolves their entry points into a function table and
//! keeps the live plugins in a name-keyed [`PluginRegistry`] that broadcasts
//! lifecycle calls to all of them.
//!
//! The plugin side of the contract lives in the `plugin_api` crate.

mod compatibility;
mod error;
mod handle;
mod host;
mod library;
mod loader;
mod registry;
mod script;

#[cfg(test)]
mod testing;

pub use compatibility::{
    is_compatible, parse_declared, CompatibilityAxis, CompatibilityDescriptor,
};
pub use error::{PluginSystemError, ScriptCallError};
pub use handle::{LoadedPlugin, PluginObject};
pub use host::{HostServices, OwnedHostContext};
pub use library::{
    canonical_name, discover_plugins, library_candidates, LibraryOpener, NativeLibrary,
    NativeOpener, PluginLibrary, RawSymbol, LIBRARY_PREFIX, PLUGIN_EXTENSION,
};
pub use loader::load_plugin;
pub use registry::{LoadOutcome, PluginRegistry};
pub use script::{
    script_type_for, ScriptPluginApi, SharedRegistry, SCRIPT_DECLARATIONS, SCRIPT_OBJECT_TYPE,
};

/// Re-export commonly used types for plugin hosts
pub use plugin_api::{LogLevel, VariantMap};
