//! # Player - Native Plugin Host
//!
//! Runs a script with native plugins loaded into the process. Plugins are
//! shared libraries built against `plugin_api`; the player loads them at
//! startup, lets them adjust engine parameters, starts them, tells them about
//! the script engine and unloads them on shutdown.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run a script with two plugins
//! player Scripts/main.as -plugin plugins/plugin_logger -plugin plugins/plugin_greeter
//!
//! # Custom configuration, debug logs, Vulkan
//! player Scripts/main.lua --config player.toml --log-level debug --graphics-api Vulkan
//! ```
//!
//! ## Configuration
//!
//! Settings come from a TOML file (default: `player.toml`), created with
//! defaults when missing. `[plugins] auto_load` additionally loads every
//! library found in the plugin directory.
//!
//! ## Signal Handling
//!
//! SIGINT (Ctrl+C) and SIGTERM stop every plugin and unload it.

use tracing::error;

pub mod app;
pub mod cli;
pub mod config;
pub mod host;
pub mod logging;
pub mod signals;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Parses arguments, sets up logging and runs the player.
///
/// Must run on a current-thread runtime: the plugin registry never leaves the
/// thread that created it.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    config.logging.quiet |= args.quiet;

    if let Err(e) = logging::setup_logging(&config.logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Application error: {:?}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start application: {e:?}");
            std::process::exit(1);
        }
    }

    Ok(())
}

// Re-export main types for potential library usage
pub use config::{GraphicsSettings, LoggingSettings, PluginSettings};
pub use host::PlayerHost;
