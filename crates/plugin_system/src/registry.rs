//! Name-keyed collection of loaded plugins.

use crate::compatibility::CompatibilityDescriptor;
use crate::error::PluginSystemError;
use crate::handle::LoadedPlugin;
use crate::host::{HostServices, OwnedHostContext};
use crate::library::{canonical_name, LibraryOpener, NativeOpener};
use crate::loader::load_plugin;
use plugin_api::VariantMap;
use std::collections::HashMap;
use std::ffi::{c_void, CString};
use std::fmt;
use std::path::Path;
use std::thread::{self, ThreadId};
use tracing::{debug, error, info, warn};

/// What a successful [`PluginRegistry::try_load`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    AlreadyLoaded,
}

/// Loads plugins, keeps them keyed by canonical name and broadcasts lifecycle
/// calls to all of them.
///
/// The registry belongs to the thread that created it. Every entry owns its
/// library and application exclusively; both are released on unload or when
/// the registry is dropped.
pub struct PluginRegistry<O: LibraryOpener = NativeOpener> {
    opener: O,
    services: Box<dyn HostServices>,
    plugins: HashMap<String, LoadedPlugin<O::Library>>,
    owner: ThreadId,
}

impl PluginRegistry<NativeOpener> {
    /// Creates a registry loading real shared libraries.
    pub fn new(services: impl HostServices + 'static) -> Self {
        Self::with_opener(NativeOpener, services)
    }
}

impl<O: LibraryOpener> PluginRegistry<O> {
    pub fn with_opener(opener: O, services: impl HostServices + 'static) -> Self {
        Self {
            opener,
            services: Box::new(services),
            plugins: HashMap::new(),
            owner: thread::current().id(),
        }
    }

    /// Loads a plugin, logging any failure. Returns whether the plugin is
    /// loaded afterwards.
    ///
    /// `force_to_start` starts the plugin right away, for plugins loaded after
    /// the host has already started.
    pub fn load(&mut self, name: &str, force_to_start: bool) -> bool {
        match self.try_load(name, force_to_start) {
            Ok(LoadOutcome::Loaded) => {
                info!("🔌 Loaded plugin: {}", name);
                true
            }
            Ok(LoadOutcome::AlreadyLoaded) => {
                debug!("Plugin {} is already loaded", name);
                true
            }
            Err(e @ PluginSystemError::Incompatible { .. }) => {
                warn!("⚠️ {}", e);
                false
            }
            Err(e) => {
                error!("❌ Failed to load plugin {}: {}", name, e);
                false
            }
        }
    }

    /// Loads a plugin and reports the failure instead of logging it.
    pub fn try_load(
        &mut self,
        name: &str,
        force_to_start: bool,
    ) -> Result<LoadOutcome, PluginSystemError> {
        self.assert_owner_thread();

        let key =
            canonical_name(name).ok_or_else(|| PluginSystemError::PluginNotFound(name.into()))?;
        if self.plugins.contains_key(&key) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        let host = OwnedHostContext::capture(self.services.as_ref());
        let plugin = load_plugin(
            &self.opener,
            &key,
            name,
            self.services.as_ref(),
            host.as_ptr(),
        )?;

        debug!("Plugin {} opened from {}", plugin.name(), plugin.path().display());
        if force_to_start {
            plugin.start();
        }

        self.plugins.insert(key, plugin);
        Ok(LoadOutcome::Loaded)
    }

    /// Destroys a plugin and releases its library. Unknown names are ignored
    /// with a warning.
    ///
    /// `force_to_stop` calls the plugin's stop hook first.
    pub fn unload(&mut self, name: &str, force_to_stop: bool) {
        self.assert_owner_thread();

        let plugin = canonical_name(name).and_then(|key| self.plugins.remove(&key));
        let Some(plugin) = plugin else {
            warn!("Cannot unload plugin {}: it is not loaded", name);
            return;
        };

        if force_to_stop {
            plugin.stop();
        }

        let host = OwnedHostContext::capture(self.services.as_ref());
        plugin.destroy(host.as_ptr());
        info!("🔌 Unloaded plugin: {}", name);
    }

    /// Destroys every plugin without stopping it and empties the registry.
    pub fn unload_all(&mut self) {
        self.assert_owner_thread();

        if self.plugins.is_empty() {
            return;
        }

        info!("🧹 Unloading {} plugin(s)", self.plugins.len());
        let host = OwnedHostContext::capture(self.services.as_ref());
        for (name, plugin) in self.plugins.drain() {
            debug!("Destroying plugin {}", name);
            plugin.destroy(host.as_ptr());
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        canonical_name(name).is_some_and(|key| self.plugins.contains_key(&key))
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Canonical names of the loaded plugins, sorted.
    pub fn plugin_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.plugins.keys().cloned().collect();
        names.sort();
        names
    }

    /// What a loaded plugin declared on each compatibility axis.
    pub fn compatibility(&self, name: &str) -> Option<&CompatibilityDescriptor> {
        let key = canonical_name(name)?;
        self.plugins.get(&key).map(LoadedPlugin::compatibility)
    }

    /// Library file a loaded plugin was opened from.
    pub fn library_path(&self, name: &str) -> Option<&Path> {
        let key = canonical_name(name)?;
        self.plugins.get(&key).map(LoadedPlugin::path)
    }

    /// Calls every plugin's setup hook with the same parameter map.
    pub fn setup(&self, parameters: &mut VariantMap) {
        self.assert_owner_thread();
        for plugin in self.plugins.values() {
            plugin.setup(parameters);
        }
    }

    pub fn start(&self) {
        self.assert_owner_thread();
        for plugin in self.plugins.values() {
            plugin.start();
        }
    }

    pub fn stop(&self) {
        self.assert_owner_thread();
        for plugin in self.plugins.values() {
            plugin.stop();
        }
    }

    /// Tells every plugin that a script engine of `script_type_name` exists.
    pub fn on_script_binding(&self, script_type_name: &str, script_context: *mut c_void) {
        self.assert_owner_thread();

        let mut type_name = script_type_name.to_string();
        type_name.retain(|c| c != '\0');
        let type_name = CString::new(type_name).unwrap_or_default();

        for plugin in self.plugins.values() {
            plugin.on_script_binding(&type_name, script_context);
        }
    }

    fn assert_owner_thread(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.owner,
            "plugin registry used outside the thread that created it"
        );
    }
}

impl<O: LibraryOpener> Drop for PluginRegistry<O> {
    fn drop(&mut self) {
        self.unload_all();
    }
}

impl<O: LibraryOpener> fmt::Debug for PluginRegistry<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugin_names())
            .finish()
    }
}
