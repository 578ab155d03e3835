//! climatecontrol
//!
//! Prints the settings materialized from prefixed environment variables and
//! an optional settings file.

use anyhow::{Result, anyhow};
use clap::Parser;
use climatecontrol::cli::{Cli, Command};
use climatecontrol::config::{DEFAULT_SPLIT_CHAR, Settings, SettingsView, env_var_name};
use climatecontrol::format::{render, render_value};
use climatecontrol::logging::{LogLevelFilter, Logger, log_level_to_tracing};
use std::fs::OpenOptions;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = log_level_to_tracing(cli.log_level());
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    match cli.command {
        Some(Command::EnvVar) => run_env_var(&cli),
        Some(Command::Get { ref key }) => run_get(&cli, key),
        Some(Command::Show) | None => run_show(&cli),
    }
}

fn load(cli: &Cli) -> Result<Settings> {
    let logger = Logger::new()
        .with_name("climatecontrol")
        .with_level_filter(Arc::new(LogLevelFilter::new(cli.log_level())));
    let options = cli.settings_options().with_logger(logger);
    let settings = Settings::new(options)?;
    debug!("Loaded {:?}", settings);
    Ok(settings)
}

/// Run the show command
fn run_show(cli: &Cli) -> Result<()> {
    let settings = load(cli)?;
    let output = render(settings.as_map(), cli.output_format())?;
    print_output(&output);
    Ok(())
}

/// Run the get command
fn run_get(cli: &Cli, key: &str) -> Result<()> {
    let settings = load(cli)?;
    let value = settings
        .lookup(key)
        .ok_or_else(|| anyhow!("settings key not found: {}", key))?;
    let output = render_value(value, cli.output_format())?;
    print_output(&output);
    Ok(())
}

/// Run the env-var command
fn run_env_var(cli: &Cli) -> Result<()> {
    println!(
        "{}",
        env_var_name(
            &[cli.env_prefix.as_str(), cli.settings_file_env_suffix.as_str()],
            DEFAULT_SPLIT_CHAR,
        )
    );
    Ok(())
}

fn print_output(output: &str) {
    // TOML and YAML renderers already end with a newline.
    if output.ends_with('\n') {
        print!("{}", output);
    } else {
        println!("{}", output);
    }
}
