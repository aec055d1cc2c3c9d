//! Startup against real files on disk, through the public player API.

use lib_player::app::{load_plugins, Application};
use lib_player::cli::CliArgs;
use lib_player::config::AppConfig;
use lib_player::PlayerHost;
use plugin_system::{PluginRegistry, PLUGIN_EXTENSION};
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_corrupt_plugin_file_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let plugin_dir = temp_dir.path().join("plugins");
    fs::create_dir(&plugin_dir).unwrap();
    fs::write(
        plugin_dir.join("broken").with_extension(PLUGIN_EXTENSION),
        "not a shared library",
    )
    .unwrap();

    let mut config = AppConfig::default();
    config.plugins.directory = plugin_dir.to_string_lossy().into_owned();
    config.plugins.auto_load = true;
    config.logging.directory = temp_dir.path().join("logs").to_string_lossy().into_owned();
    let config_path = temp_dir.path().join("player.toml");
    fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

    let absent = temp_dir.path().join("absent");
    let args = CliArgs::try_parse_from([
        "player",
        "Scripts/main.lua",
        "--config",
        config_path.to_str().unwrap(),
        "-plugin",
        absent.to_str().unwrap(),
    ])
    .unwrap();
    let mut app = Application::new(args).await.unwrap();

    let names = app.startup_plugins().unwrap();
    assert_eq!(names.len(), 2);

    let mut registry = PluginRegistry::new(PlayerHost::from_config(app.config()));
    assert_eq!(load_plugins(&mut registry, &names), 0);
    assert!(registry.is_empty());
    assert!(!app.setup_plugins(&registry));
}

#[tokio::test]
async fn test_default_config_is_written_on_first_run() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("player.toml");

    let args =
        CliArgs::try_parse_from(["player", "--config", config_path.to_str().unwrap()]).unwrap();
    let app = Application::new(args).await.unwrap();

    assert!(config_path.exists());
    assert_eq!(app.config().plugins.directory, "plugins");
    assert!(app.startup_plugins().unwrap().is_empty());
}
