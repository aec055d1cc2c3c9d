//! Opening a plugin library and turning it into a [`LoadedPlugin`].
//!
//! Every step either succeeds or returns an error. The library value is owned
//! by this function until the very end, so any early return drops it and the
//! library is released exactly once. Nothing partially resolved escapes.

use crate::compatibility::{
    is_compatible, parse_declared, CompatibilityAxis, CompatibilityDescriptor,
};
use crate::error::PluginSystemError;
use crate::handle::{LoadedPlugin, PluginObject};
use crate::host::HostServices;
use crate::library::{library_candidates, LibraryOpener, PluginLibrary, RawSymbol};
use plugin_api::abi::read_c_string;
use plugin_api::{symbols, CompatibilityFn, HostContext};
use std::mem;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use tracing::{debug, trace};

/// Loads the plugin called `name` and creates its application.
///
/// `key` is the canonical registry key derived from `name`.
pub fn load_plugin<O: LibraryOpener>(
    opener: &O,
    key: &str,
    name: &str,
    services: &dyn HostServices,
    host: *const HostContext,
) -> Result<LoadedPlugin<O::Library>, PluginSystemError> {
    let (library, path) = open_library(opener, name)?;
    debug!("Opened plugin library {}", path.display());

    let mut compatibility = CompatibilityDescriptor::default();
    let mut accessors: Vec<CompatibilityFn> = Vec::with_capacity(CompatibilityAxis::ALL.len());
    for axis in CompatibilityAxis::ALL {
        let accessor: CompatibilityFn =
            unsafe { resolve(&library, axis.plugin_symbol(), &path)? };
        let declared = check_axis(key, axis, accessor, services)?;
        compatibility.set_axis(axis, declared);
        accessors.push(accessor);
    }

    let object = unsafe {
        PluginObject {
            get_engine_version: accessors[0],
            get_compiler_id: accessors[1],
            get_compiler_version: accessors[2],
            get_os_version: accessors[3],
            get_graphics_api: accessors[4],
            create_application: resolve(&library, symbols::CREATE_APPLICATION, &path)?,
            destroy_application: resolve(&library, symbols::DESTROY_APPLICATION, &path)?,
            setup: resolve(&library, symbols::SETUP, &path)?,
            start: resolve(&library, symbols::START, &path)?,
            stop: resolve(&library, symbols::STOP, &path)?,
            on_script_binding: resolve(&library, symbols::ON_SCRIPT_BINDING, &path)?,
        }
    };

    let application = unsafe { (object.create_application)(host) };
    let application = NonNull::new(application)
        .ok_or_else(|| PluginSystemError::CreationFailed(key.to_string()))?;

    Ok(LoadedPlugin::new(
        key.to_string(),
        path,
        compatibility,
        object,
        application,
        library,
    ))
}

fn open_library<O: LibraryOpener>(
    opener: &O,
    name: &str,
) -> Result<(O::Library, PathBuf), PluginSystemError> {
    let mut first_failure = None;

    for candidate in library_candidates(name) {
        match opener.open(&candidate) {
            Ok(library) => return Ok((library, candidate)),
            Err(reason) => {
                trace!("Could not open {}: {}", candidate.display(), reason);
                if first_failure.is_none() {
                    first_failure = Some((candidate, reason));
                }
            }
        }
    }

    let (path, reason) =
        first_failure.unwrap_or_else(|| (PathBuf::from(name), "no candidate path".to_string()));
    Err(PluginSystemError::LibraryNotFound { path, reason })
}

/// Calls one compatibility accessor and checks it against the host.
fn check_axis(
    plugin: &str,
    axis: CompatibilityAxis,
    accessor: CompatibilityFn,
    services: &dyn HostServices,
) -> Result<Vec<String>, PluginSystemError> {
    let declared = unsafe { read_c_string(accessor()) }.ok_or_else(|| {
        PluginSystemError::InvalidCompatibilityString {
            plugin: plugin.to_string(),
            symbol: axis.plugin_symbol(),
        }
    })?;

    let host_value = services.host_value(axis);
    let accepted = parse_declared(&declared);
    if !is_compatible(&accepted, &host_value) {
        return Err(PluginSystemError::Incompatible {
            plugin: plugin.to_string(),
            host_accessor: axis.host_accessor(),
            plugin_accessor: axis.plugin_symbol(),
            host_value,
            declared,
        });
    }

    trace!("Plugin '{}' accepts host {} '{}'", plugin, axis, host_value);
    Ok(accepted.into_iter().map(str::to_string).collect())
}

/// Resolves `symbol` as a function pointer of type `F`.
///
/// # Safety
///
/// `F` must be a function pointer type matching the export's real signature.
unsafe fn resolve<F: Copy>(
    library: &impl PluginLibrary,
    symbol: &'static str,
    path: &Path,
) -> Result<F, PluginSystemError> {
    debug_assert_eq!(mem::size_of::<F>(), mem::size_of::<RawSymbol>());

    match library.symbol(symbol) {
        Some(raw) if !raw.is_null() => Ok(mem::transmute_copy::<RawSymbol, F>(&raw)),
        _ => Err(PluginSystemError::MissingExport {
            symbol,
            path: path.to_path_buf(),
        }),
    }
}
