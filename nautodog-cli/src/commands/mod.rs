//! Command handler modules for the CLI.

mod completions;
mod config;
mod manpage;
mod remote;
mod snmp;
mod stubs;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;
use crate::util::format_params;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(config_path: Option<&Path>, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Ddsnmpconfig(subcommand) => stubs::cmd_ddsnmpconfig(&subcommand),
        Commands::Ddmonitor(subcommand) => stubs::cmd_ddmonitor(&subcommand),
        Commands::Ddmainconfig(subcommand) => stubs::cmd_ddmainconfig(&subcommand),
        Commands::Ddagent(subcommand) => stubs::cmd_ddagent(&subcommand),
        Commands::Report(subcommand) => stubs::cmd_report(&subcommand),
        Commands::Remote(subcommand) => remote::cmd_remote(config_path, subcommand),
        Commands::Snmp(subcommand) => snmp::cmd_snmp(subcommand),
        Commands::Config(subcommand) => config::cmd_config(config_path, subcommand),
        Commands::Completions { shell } => completions::cmd_completions(shell),
        Commands::Manpage => manpage::cmd_manpage(),
    }
}

/// Logs a command invocation with its parameters.
///
/// Secrets must be left out of `params` by the caller.
pub fn log_command(command_path: &str, params: &[(&str, String)]) {
    tracing::info!(
        "Executing command: '{command_path}' with parameters: {{ {} }}",
        format_params(params)
    );
}
