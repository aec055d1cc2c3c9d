//! Command-line interface handling for the player.
//!
//! Besides the usual GNU-style options, the player accepts the classic
//! single-dash `-plugin <path>` spelling, in any letter case, for every plugin
//! to load at startup.

use clap::{Arg, ArgAction, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// Command line arguments parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// Script the player runs; its extension selects the script engine
    pub script_file: Option<PathBuf>,
    /// Plugins to load at startup, in order
    pub plugins: Vec<String>,
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Whether to silence log output on standard output
    pub quiet: bool,
    /// Optional override for the graphics API reported to plugins
    pub graphics_api: Option<String>,
}

impl CliArgs {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::parse_from(std::env::args_os())
    }

    pub fn parse_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let matches = command().get_matches_from(normalize_legacy_args(args));
        Self::from_matches(&matches)
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let matches = command().try_get_matches_from(normalize_legacy_args(args))?;
        Ok(Self::from_matches(&matches))
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self {
            script_file: matches.get_one::<String>("script").map(PathBuf::from),
            plugins: matches
                .get_many::<String>("plugin")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("player.toml")),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            quiet: matches.get_flag("quiet"),
            graphics_api: matches.get_one::<String>("graphics-api").cloned(),
        }
    }
}

fn command() -> Command {
    Command::new("Player")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Runs a script with native plugins loaded")
        .arg(
            Arg::new("script")
                .value_name("SCRIPT")
                .help("Script file to run (.as for AngelScript, .lua/.luc for Lua)"),
        )
        .arg(
            Arg::new("plugin")
                .short('p')
                .long("plugin")
                .value_name("PATH")
                .help("Plugin library to load at startup; may be repeated")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("player.toml"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Do not write log output to standard output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("graphics-api")
                .long("graphics-api")
                .value_name("API")
                .help("Graphics API name reported to plugins (e.g. OpenGL, Vulkan)"),
        )
}

/// Rewrites the legacy `-plugin` flag to `--plugin`.
fn normalize_legacy_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg: OsString| {
            if arg
                .to_str()
                .is_some_and(|s| s.eq_ignore_ascii_case("-plugin"))
            {
                OsString::from("--plugin")
            } else {
                arg
            }
        })
        .collect()
}
