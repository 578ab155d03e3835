//! CLI command definitions for climatecontrol
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::config::{
    DEFAULT_ENV_PREFIX, DEFAULT_SETTINGS_FILE_ENV_SUFFIX, FilterSpec, SettingsOptions,
};
use crate::format::OutputFormat;
use crate::logging::LogLevel;
use clap::{Parser, Subcommand};

/// Materialize settings from environment variables and a settings file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file path, or inline TOML text starting with '['
    #[arg(short, long, global = true)]
    pub settings_file: Option<String>,

    /// Prefix of the environment variables to read
    #[arg(short, long, default_value = DEFAULT_ENV_PREFIX, global = true)]
    pub env_prefix: String,

    /// Suffix of the variable naming the settings file (<PREFIX>_<SUFFIX>)
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE_ENV_SUFFIX, global = true)]
    pub settings_file_env_suffix: String,

    /// Subtree filter: a section name or JSON (e.g. '{"db": "host"}').
    /// Repeat to merge several filters.
    #[arg(short, long, global = true)]
    pub filter: Vec<FilterSpec>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the materialized settings (default if no subcommand given)
    Show,

    /// Print one value by dotted key, e.g. `db.host`
    Get {
        /// Dotted key path
        key: String,
    },

    /// Print the name of the environment variable that selects the settings file
    EnvVar,
}

impl Cli {
    /// Combined filter: none, the single `--filter`, or all of them merged.
    pub fn filters(&self) -> FilterSpec {
        match self.filter.as_slice() {
            [] => FilterSpec::All,
            [single] => single.clone(),
            many => FilterSpec::Many(many.to_vec()),
        }
    }

    /// Loader options described by the flags.
    pub fn settings_options(&self) -> SettingsOptions {
        let mut options = SettingsOptions::new()
            .with_env_prefix(&self.env_prefix)
            .with_settings_file_env_suffix(&self.settings_file_env_suffix)
            .with_filters(self.filters());
        if let Some(ref settings_file) = self.settings_file {
            options = options.with_settings_file(settings_file);
        }
        options
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    /// Minimum level for diagnostics: debug with `--verbose`, info otherwise.
    pub fn log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["climatecontrol"]).unwrap();
        assert_eq!(cli.env_prefix, "APP_SETTINGS");
        assert_eq!(cli.settings_file_env_suffix, "SETTINGS_FILE");
        assert_eq!(cli.filters(), FilterSpec::All);
        assert_eq!(cli.output_format(), OutputFormat::Json);
        assert_eq!(cli.log_level(), LogLevel::Info);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_filters_parse() {
        let cli = Cli::try_parse_from([
            "climatecontrol",
            "--filter",
            "section1",
            "--filter",
            r#"{"section2": "subsection2"}"#,
        ])
        .unwrap();
        assert_eq!(
            cli.filters(),
            FilterSpec::Many(vec![
                FilterSpec::key("section1"),
                FilterSpec::keyed([("section2", FilterSpec::key("subsection2"))]),
            ])
        );
    }

    #[test]
    fn test_verbose_lowers_log_level() {
        let cli = Cli::try_parse_from(["climatecontrol", "-v", "--format", "yml"]).unwrap();
        assert_eq!(cli.log_level(), LogLevel::Debug);
        assert_eq!(cli.output_format(), OutputFormat::Yaml);
    }

    #[test]
    fn test_invalid_filter_rejected() {
        assert!(Cli::try_parse_from(["climatecontrol", "--filter", "[1]"]).is_err());
    }

    #[test]
    fn test_get_subcommand_with_global_flags() {
        let cli = Cli::try_parse_from([
            "climatecontrol",
            "get",
            "db.host",
            "--env-prefix",
            "MY_APP",
            "--format",
            "toml",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Command::Get { ref key }) if key == "db.host"));
        assert_eq!(cli.env_prefix, "MY_APP");
        assert_eq!(cli.output_format(), OutputFormat::Toml);
    }

    #[test]
    fn test_settings_options() {
        let cli = Cli::try_parse_from(["climatecontrol", "-s", "app.toml", "-f", "db"]).unwrap();
        let options = cli.settings_options();
        assert_eq!(options.settings_file.as_deref(), Some("app.toml"));
        assert_eq!(options.filters, FilterSpec::key("db"));
    }
}
