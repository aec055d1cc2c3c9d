//! Private per-plugin logging.
//!
//! A plugin library carries its own copy of `tracing`, so the host's global
//! subscriber is invisible from inside it, and several plugins installing
//! global subscribers would fight over the same slot. Instead every plugin
//! application owns a [`PluginLog`]: a dispatcher that is never registered
//! globally and is only made current while one of the plugin's hooks runs.

use crate::application::PluginContext;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::{fmt, layer::SubscriberExt};

/// A plugin's private log sink.
pub struct PluginLog {
    dispatch: Dispatch,
    file: Option<PathBuf>,
}

impl PluginLog {
    /// Opens `<plugin>.log` in the host's log directory with the host's level
    /// and quiet mode.
    ///
    /// A log file that cannot be created is not fatal: the log keeps its
    /// standard-output layer (unless quiet) and records the failure there.
    pub fn open(context: &PluginContext) -> Self {
        let path = context.log_file();

        let (file_layer, file, open_error) = match open_log_file(&path) {
            Ok(handle) => (
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_thread_names(true)
                        .with_writer(Mutex::new(handle)),
                ),
                Some(path.clone()),
                None,
            ),
            Err(e) => (None, None, Some(e)),
        };

        let stdout_layer = (!context.is_quiet()).then(|| {
            fmt::layer()
                .with_ansi(true)
                .with_target(false)
                .with_writer(io::stdout)
        });

        let subscriber = tracing_subscriber::registry()
            .with(context.log_level().to_level_filter())
            .with(file_layer)
            .with(stdout_layer);

        let log = Self {
            dispatch: Dispatch::new(subscriber),
            file,
        };

        if let Some(e) = open_error {
            log.in_scope(|| {
                tracing::warn!("Unable to open plugin log file {}: {}", path.display(), e)
            });
        }

        log
    }

    /// Runs `f` with this log as the current tracing dispatcher.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Path of the log file, if it could be opened.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}

impl std::fmt::Debug for PluginLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLog").field("file", &self.file).finish()
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    File::create(path)
}
