//! Dynamic library access and plugin path conventions.
//!
//! The loader only needs two things from a shared library: open it, and look
//! up a symbol address by name. [`LibraryOpener`] and [`PluginLibrary`] capture
//! exactly that, with [`NativeOpener`] as the `libloading` backend.

use crate::error::PluginSystemError;
use std::ffi::c_void;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Address of an exported symbol.
pub type RawSymbol = *const c_void;

/// An open library that can resolve exports by name.
///
/// Dropping the value releases the library.
pub trait PluginLibrary {
    /// Returns the address of `name`, or `None` when it is not exported.
    fn symbol(&self, name: &str) -> Option<RawSymbol>;
}

/// Opens plugin libraries from paths.
pub trait LibraryOpener {
    type Library: PluginLibrary;

    fn open(&self, path: &Path) -> Result<Self::Library, String>;
}

/// Shared library opened through `libloading`.
#[derive(Debug)]
pub struct NativeLibrary {
    library: libloading::Library,
}

impl PluginLibrary for NativeLibrary {
    fn symbol(&self, name: &str) -> Option<RawSymbol> {
        // Only the address is taken here; the loader casts it to the real type.
        let symbol = unsafe {
            self.library
                .get::<unsafe extern "C" fn()>(name.as_bytes())
                .ok()?
        };
        Some(*symbol as RawSymbol)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeOpener;

impl LibraryOpener for NativeOpener {
    type Library = NativeLibrary;

    fn open(&self, path: &Path) -> Result<NativeLibrary, String> {
        // Running a library's initializers is inherent to loading a plugin.
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| e.to_string())?;
        Ok(NativeLibrary { library })
    }
}

/// Shared library extension of the target platform, without the dot.
#[cfg(target_os = "windows")]
pub const PLUGIN_EXTENSION: &str = "dll";
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub const PLUGIN_EXTENSION: &str = "dylib";
#[cfg(any(target_os = "emscripten", target_family = "wasm"))]
pub const PLUGIN_EXTENSION: &str = "js";
#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "ios", target_os = "emscripten"))
))]
pub const PLUGIN_EXTENSION: &str = "so";
#[cfg(not(any(windows, unix, target_family = "wasm")))]
pub const PLUGIN_EXTENSION: &str = "";

/// File name prefix the platform's toolchains give shared libraries.
#[cfg(any(windows, target_os = "emscripten", target_family = "wasm"))]
pub const LIBRARY_PREFIX: &str = "";
#[cfg(not(any(windows, target_os = "emscripten", target_family = "wasm")))]
pub const LIBRARY_PREFIX: &str = "lib";

/// Registry key for a plugin name or path: the file name without directory,
/// extension or platform library prefix.
///
/// `plugins/hud`, `plugins/libhud.so` and `hud` all name the same plugin, so
/// whichever spelling opened the library, a second load finds it registered.
pub fn canonical_name(name: &str) -> Option<String> {
    let stem = Path::new(name).file_stem()?.to_string_lossy();
    if stem.is_empty() {
        None
    } else {
        Some(strip_library_prefix(&stem).to_string())
    }
}

fn strip_library_prefix(stem: &str) -> &str {
    if LIBRARY_PREFIX.is_empty() {
        return stem;
    }
    stem.strip_prefix(LIBRARY_PREFIX)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(stem)
}

/// Paths tried, in order, when opening the plugin called `name`.
///
/// The first candidate carries the platform extension. Where libraries are
/// usually prefixed, a `lib`-prefixed sibling follows unless the name already
/// has the prefix.
pub fn library_candidates(name: &str) -> Vec<PathBuf> {
    let path = Path::new(name).with_extension(PLUGIN_EXTENSION);
    let mut candidates = vec![path.clone()];

    if !LIBRARY_PREFIX.is_empty() {
        if let Some(file_name) = path.file_name().map(|f| f.to_string_lossy().into_owned()) {
            if !file_name.starts_with(LIBRARY_PREFIX) {
                candidates.push(path.with_file_name(format!("{LIBRARY_PREFIX}{file_name}")));
            }
        }
    }

    candidates
}

/// Finds plugin libraries directly inside `directory`.
///
/// Returns loadable names (directory joined with the file stem, without the
/// library prefix) in sorted order. A missing directory yields no names.
pub fn discover_plugins(directory: &Path) -> Result<Vec<String>, PluginSystemError> {
    if !directory.exists() {
        warn!("Plugin directory does not exist: {}", directory.display());
        return Ok(Vec::new());
    }

    if !directory.is_dir() {
        return Err(PluginSystemError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotADirectory,
            format!("Plugin path is not a directory: {}", directory.display()),
        )));
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let is_plugin = path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(PLUGIN_EXTENSION))
            .unwrap_or(false);
        if !is_plugin {
            continue;
        }

        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let stem = strip_library_prefix(&stem);

        debug!("Discovered plugin library {}", path.display());
        names.push(directory.join(stem).to_string_lossy().into_owned());
    }

    names.sort();
    names.dedup();
    Ok(names)
}
