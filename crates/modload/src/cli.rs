//! Command-line interface handling for `modload`.
//!
//! Every flag is optional and overrides the matching configuration file
//! setting.

use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// How the final scan summary is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the module path variable name
    pub env_var: Option<String>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// List candidates instead of loading them
    pub dry_run: bool,
    /// Optional override for the directory depth limit
    pub max_depth: Option<usize>,
    /// Output format of the summary
    pub report: ReportFormat,
}

impl CliArgs {
    /// Parses the process arguments, exiting with usage on error.
    pub fn parse() -> Self {
        Self::try_parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let report = match matches.get_one::<String>("report").map(String::as_str) {
            Some("json") => ReportFormat::Json,
            _ => ReportFormat::Text,
        };

        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH)),
            env_var: matches.get_one::<String>("var").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            dry_run: matches.get_flag("dry-run"),
            max_depth: matches.get_one::<usize>("max-depth").copied(),
            report,
        }
    }
}

const DEFAULT_CONFIG_PATH: &str = "modload.toml";

fn command() -> Command {
    Command::new("modload")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Loads every shared module found under the module path variable")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .arg(
            Arg::new("var")
                .short('e')
                .long("var")
                .value_name("NAME")
                .help("Environment variable holding the module path list"),
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
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Walk the module paths without loading anything")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-depth")
                .long("max-depth")
                .value_name("N")
                .help("Maximum directory depth below each module path")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("FORMAT")
                .help("Summary format printed to stdout")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
}
