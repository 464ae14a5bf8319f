//! Man page generation command.

use clap::CommandFactory;

use crate::cli::Cli;
use crate::error::CliError;

/// Generate man page to stdout
pub fn cmd_manpage() -> Result<(), CliError> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    man.render(&mut std::io::stdout()).map_err(CliError::Io)?;
    Ok(())
}
