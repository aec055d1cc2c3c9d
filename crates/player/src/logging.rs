//! Logging system setup and configuration.
//!
//! The host installs one global `tracing-subscriber` registry. Plugins never
//! see it: each one logs through its own private dispatcher and only copies
//! the level, quiet mode and log directory from the host.

use crate::config::LoggingSettings;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the host's global subscriber.
///
/// `RUST_LOG` wins over the configured level. Quiet mode drops the standard
/// output layer entirely.
pub fn setup_logging(
    config: &LoggingSettings,
    json_format: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = config.level.as_str();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    let stdout = !config.quiet;

    if json_format || config.json_format {
        registry
            .with(stdout.then(|| {
                fmt::layer()
                    .json()
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(true)
                    .with_thread_names(true)
            }))
            .try_init()?;
    } else {
        registry
            .with(stdout.then(|| {
                fmt::layer()
                    .with_ansi(true)
                    .with_file(false)
                    .with_line_number(false)
                    .with_thread_ids(true)
                    .with_thread_names(true)
            }))
            .try_init()?;
    }

    info!("🔧 Logging initialized with level: {}", log_level);
    Ok(())
}

/// Displays the startup banner.
pub fn display_banner() {
    let version = option_env!("CARGO_PKG_VERSION").unwrap_or("UNK");
    info!("╔══════════════════════════════════════════╗");
    info!("║              🎮 PLAYER 🎮                ║");
    info!("║                 v{:<8}                ║", version);
    info!("║                                          ║");
    info!("║  Native plugin host                      ║");
    info!("║  🔌 {:<37}║", plugin_api::plugin_api_build_info());
    info!("╚══════════════════════════════════════════╝");
}
