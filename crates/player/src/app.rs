//! Main application logic and lifecycle management.
//!
//! The `Application` drives the plugin registry through the player's life:
//! load startup plugins, let them adjust engine parameters, start them, tell
//! them about the script engine, and finally stop and unload them on shutdown.

use crate::cli::CliArgs;
use crate::config::AppConfig;
use crate::host::PlayerHost;
use crate::logging::display_banner;
use crate::signals::wait_for_shutdown_signal;
use plugin_api::VariantMap;
use plugin_system::{
    canonical_name, discover_plugins, script_type_for, LibraryOpener, PluginRegistry,
    PluginSystemError, ScriptPluginApi, SharedRegistry,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

pub struct Application {
    /// Loaded application configuration
    config: AppConfig,
    config_path: PathBuf,
    script_file: Option<PathBuf>,
    /// Plugins named on the command line
    cli_plugins: Vec<String>,
}

impl Application {
    /// Loads configuration, applies CLI overrides and validates the result.
    pub async fn new(args: CliArgs) -> Result<Self, Box<dyn std::error::Error>> {
        info!("🔧 Loading configuration from: {}", args.config_path.display());
        let mut config = AppConfig::load_from_file(&args.config_path).await?;

        if let Some(log_level) = args.log_level {
            config.logging.level = log_level;
        }

        if args.json_logs {
            config.logging.json_format = true;
        }

        if args.quiet {
            config.logging.quiet = true;
        }

        if let Some(graphics_api) = args.graphics_api {
            config.graphics.api = graphics_api;
        }

        if let Err(e) = config.validate() {
            return Err(format!("Configuration validation failed: {e}").into());
        } else {
            info!("✅ Configuration loaded and validated successfully");
        }

        display_banner();

        Ok(Self {
            config,
            config_path: args.config_path,
            script_file: args.script_file,
            cli_plugins: args.plugins,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs the player until a shutdown signal arrives.
    pub async fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        info!("🌟 Starting player");
        self.log_configuration_summary();

        let registry: SharedRegistry =
            Rc::new(RefCell::new(PluginRegistry::new(PlayerHost::from_config(&self.config))));
        let bridge = ScriptPluginApi::new(Rc::clone(&registry));

        let names = self.startup_plugins()?;
        load_plugins(&mut *registry.borrow_mut(), &names);

        self.setup_plugins(&*registry.borrow());
        registry.borrow().start();

        if let Some(script_file) = &self.script_file {
            bind_script(&*registry.borrow(), script_file, &bridge);
        } else {
            debug!("No script file given, skipping script binding");
        }

        info!(
            "✅ Player is running with {} plugin(s): {:?}",
            registry.borrow().len(),
            registry.borrow().plugin_names()
        );
        info!("🛑 Press Ctrl+C to stop");

        wait_for_shutdown_signal().await?;

        registry.borrow().stop();
        registry.borrow_mut().unload_all();

        info!("✅ Player shutdown complete");
        Ok(())
    }

    /// Plugins to load at startup, in load order: configured preloads,
    /// then discovered libraries, then command-line plugins.
    pub fn startup_plugins(&self) -> Result<Vec<String>, PluginSystemError> {
        let settings = &self.config.plugins;
        let mut names = settings.preload.clone();

        if settings.auto_load {
            let discovered = discover_plugins(Path::new(&settings.directory))?;
            info!("🔍 Found {} plugin file(s) in {}", discovered.len(), settings.directory);

            names.extend(discovered.into_iter().filter(|name| {
                let allowed = is_whitelisted(&settings.whitelist, name);
                if !allowed {
                    debug!("Skipping {}: not in the plugin whitelist", name);
                }
                allowed
            }));
        }

        names.extend(self.cli_plugins.iter().cloned());
        Ok(names)
    }

    /// Broadcasts setup and merges the parameters plugins asked for.
    ///
    /// Returns whether the engine parameters were reinitialized.
    pub fn setup_plugins<O: LibraryOpener>(&mut self, registry: &PluginRegistry<O>) -> bool {
        if registry.is_empty() {
            return false;
        }

        let mut parameters = VariantMap::new();
        registry.setup(&mut parameters);
        if parameters.is_empty() {
            return false;
        }

        let merged = self.config.merge_engine_parameters(&parameters);
        info!(
            "🔁 Reinitializing engine with {} plugin parameter(s): {:?}",
            merged,
            parameters.keys().collect::<Vec<_>>()
        );
        true
    }

    fn log_configuration_summary(&self) {
        info!("📋 Configuration Summary:");
        info!("  📂 Config file: {}", self.config_path.display());
        info!("  🔌 Plugin directory: {}", self.config.plugins.directory);
        info!("  🔁 Auto-load plugins: {}", self.config.plugins.auto_load);
        info!("  🖥️ Graphics API: {}", self.config.graphics.api);
        info!("  📝 Plugin log directory: {}", self.config.logging.directory);
        if let Some(script_file) = &self.script_file {
            info!("  📜 Script: {}", script_file.display());
        }
    }
}

/// Loads every plugin without starting it. Returns how many are loaded.
pub fn load_plugins<O: LibraryOpener>(
    registry: &mut PluginRegistry<O>,
    names: &[String],
) -> usize {
    let loaded = names
        .iter()
        .filter(|name| registry.load(name, false))
        .count();

    if loaded < names.len() {
        warn!(
            "⚠️ {} of {} startup plugin(s) failed to load",
            names.len() - loaded,
            names.len()
        );
    }
    loaded
}

/// Tells every plugin which script engine runs `script_file`.
pub fn bind_script<O: LibraryOpener>(
    registry: &PluginRegistry<O>,
    script_file: &Path,
    bridge: &ScriptPluginApi<O>,
) {
    let script_type = script_type_for(script_file);
    info!("📜 Binding {} plugin(s) to {}", registry.len(), script_type);
    registry.on_script_binding(script_type, bridge.as_script_context());
}

fn is_whitelisted(whitelist: &[String], name: &str) -> bool {
    if whitelist.is_empty() {
        return true;
    }

    let key = canonical_name(name);
    whitelist
        .iter()
        .any(|allowed| canonical_name(allowed) == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_system::{LIBRARY_PREFIX, PLUGIN_EXTENSION};
    use std::fs;
    use tempfile::TempDir;

    async fn application(temp_dir: &TempDir, config: AppConfig, args: &[&str]) -> Application {
        let config_path = temp_dir.path().join("player.toml");
        fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let mut argv = vec!["player", "--config", config_path.to_str().unwrap()];
        argv.extend_from_slice(args);
        Application::new(CliArgs::try_parse_from(argv).unwrap())
            .await
            .unwrap()
    }

    fn plugin_file(directory: &Path, stem: &str) {
        fs::write(directory.join(stem).with_extension(PLUGIN_EXTENSION), "x").unwrap();
    }

    #[tokio::test]
    async fn test_cli_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        let app = application(
            &temp_dir,
            AppConfig::default(),
            &["--log-level", "debug", "--quiet", "--graphics-api", "Vulkan"],
        )
        .await;

        assert_eq!(app.config().logging.level, "debug");
        assert!(app.config().logging.quiet);
        assert_eq!(app.config().graphics.api, "Vulkan");
    }

    #[tokio::test]
    async fn test_invalid_override_fails_validation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("player.toml");
        let args = CliArgs::try_parse_from([
            "player",
            "--config",
            config_path.to_str().unwrap(),
            "--log-level",
            "chatty",
        ])
        .unwrap();

        assert!(Application::new(args).await.is_err());
    }

    #[tokio::test]
    async fn test_startup_plugin_order() {
        let temp_dir = TempDir::new().unwrap();
        let plugin_dir = temp_dir.path().join("plugins");
        fs::create_dir(&plugin_dir).unwrap();
        plugin_file(&plugin_dir, &format!("{LIBRARY_PREFIX}zeta"));
        plugin_file(&plugin_dir, "alpha");

        let mut config = AppConfig::default();
        config.plugins.directory = plugin_dir.to_string_lossy().into_owned();
        config.plugins.auto_load = true;
        config.plugins.preload = vec!["preloaded".to_string()];

        let app = application(&temp_dir, config, &["-plugin", "from_cli"]).await;
        let names = app.startup_plugins().unwrap();

        let discovered = |stem: &str| plugin_dir.join(stem).to_string_lossy().into_owned();
        assert_eq!(
            names,
            vec![
                "preloaded".to_string(),
                discovered("alpha"),
                discovered("zeta"),
                "from_cli".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_whitelist_limits_discovered_plugins() {
        let temp_dir = TempDir::new().unwrap();
        let plugin_dir = temp_dir.path().join("plugins");
        fs::create_dir(&plugin_dir).unwrap();
        plugin_file(&plugin_dir, "alpha");
        plugin_file(&plugin_dir, "beta");

        let mut config = AppConfig::default();
        config.plugins.directory = plugin_dir.to_string_lossy().into_owned();
        config.plugins.auto_load = true;
        config.plugins.whitelist = vec!["beta".to_string()];

        let app = application(&temp_dir, config, &[]).await;
        let names = app.startup_plugins().unwrap();

        assert_eq!(names, vec![plugin_dir.join("beta").to_string_lossy().into_owned()]);
    }

    #[tokio::test]
    async fn test_discovery_is_skipped_without_auto_load() {
        let temp_dir = TempDir::new().unwrap();
        let plugin_dir = temp_dir.path().join("plugins");

        let mut config = AppConfig::default();
        config.plugins.directory = plugin_dir.to_string_lossy().into_owned();

        let app = application(&temp_dir, config, &[]).await;

        assert!(app.startup_plugins().unwrap().is_empty());
        assert!(!plugin_dir.exists());
    }

    #[tokio::test]
    async fn test_missing_plugins_do_not_stop_startup() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = application(&temp_dir, AppConfig::default(), &[]).await;
        let engine_before = app.config().engine.clone();

        let mut registry = PluginRegistry::new(PlayerHost::from_config(app.config()));
        let names = vec![
            temp_dir.path().join("absent_one").to_string_lossy().into_owned(),
            temp_dir.path().join("absent_two").to_string_lossy().into_owned(),
        ];

        assert_eq!(load_plugins(&mut registry, &names), 0);
        assert!(registry.is_empty());
        assert!(!app.setup_plugins(&registry));
        assert_eq!(app.config().engine, engine_before);
    }

    #[test]
    fn test_whitelist_matches_canonical_names() {
        let whitelist = vec!["plugin_greeter".to_string()];
        assert!(is_whitelisted(&whitelist, "plugins/plugin_greeter"));
        assert!(is_whitelisted(&whitelist, "plugin_greeter.so"));
        assert!(!is_whitelisted(&whitelist, "plugins/plugin_logger"));
        assert!(is_whitelisted(&[], "anything"));
    }
}
