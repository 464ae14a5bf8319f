//! `nautodog` - command-line interface for SNMP device operations
//!
//! Provides placeholder device command groups (SNMP configuration,
//! monitors, agent, reports) alongside working commands for remote file
//! transfer, SNMP credential checks and configuration inspection.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::{Cli, LogFormat};
use nautodog_core::tracing::{TracingConfig, TracingFormat, TracingLevel, init_tracing};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&tracing_config(&cli)) {
        eprintln!("Warning: logging disabled: {e}");
    }
    tracing::info!("Nautodog CLI application initialized");

    let config_path = cli.config.as_deref();
    let result = commands::dispatch(config_path, cli.command);

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

/// `-q` wins over `-v`, which wins over `--log-level` / `LOG_LEVEL`
fn tracing_config(cli: &Cli) -> TracingConfig {
    let level = if cli.quiet {
        TracingLevel::Error
    } else if let Some(level) = TracingLevel::from_verbosity(cli.verbose) {
        level
    } else {
        cli.log_level
            .as_deref()
            .map(TracingLevel::parse_lenient)
            .unwrap_or_default()
    };

    let format = match cli.log_format {
        LogFormat::Text => TracingFormat::Text,
        LogFormat::Json => TracingFormat::Json,
    };

    TracingConfig::new().with_level(level).with_format(format)
}
