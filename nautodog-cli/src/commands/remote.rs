//! Remote host check, download and upload commands.

use std::path::Path;

use nautodog_core::config::{BackupPolicy, TransferSettings};
use nautodog_core::remote::{Direction, HostTarget, RemoteHost, TransferOutcome};
use secrecy::SecretString;

use crate::cli::{RemoteCommands, RemoteTargetArgs};
use crate::error::CliError;
use crate::util::transfer_settings;

use super::log_command;

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Remote command handler
pub fn cmd_remote(config_path: Option<&Path>, command: RemoteCommands) -> Result<(), CliError> {
    match command {
        RemoteCommands::Check { target } => {
            log_command("nautodog remote check", &target_params(&target));
            let settings = transfer_settings(config_path)?;
            let host = connect(&target, settings)?;
            println!(
                "{GREEN}{BOLD}✓{RESET} Connected to {}",
                host.target().display_name()
            );
            Ok(())
        }
        RemoteCommands::Download {
            target,
            remote,
            output,
        } => {
            let mut params = target_params(&target);
            params.push(("remote", remote.clone()));
            if let Some(output) = &output {
                params.push(("output", output.display().to_string()));
            }
            log_command("nautodog remote download", &params);

            let settings = transfer_settings(config_path)?;
            let mut host = connect(&target, settings)?;
            let outcome = host.download_file(&remote, output.as_deref())?;
            print_outcome(&outcome);
            Ok(())
        }
        RemoteCommands::Upload {
            target,
            local,
            remote,
            require_backup,
        } => {
            let mut params = target_params(&target);
            params.push(("local", local.display().to_string()));
            params.push(("remote", remote.clone()));
            params.push(("require_backup", require_backup.to_string()));
            log_command("nautodog remote upload", &params);

            let mut settings = transfer_settings(config_path)?;
            if require_backup {
                settings = settings.with_backup_policy(BackupPolicy::Required);
            }
            let mut host = connect(&target, settings)?;
            let outcome = host.upload_file(&local, &remote)?;
            print_outcome(&outcome);
            Ok(())
        }
    }
}

/// Builds the target and runs the initial connection check
fn connect(args: &RemoteTargetArgs, settings: TransferSettings) -> Result<RemoteHost, CliError> {
    let password = if args.ask_password {
        let prompt = format!("Password for {}@{}: ", args.user, args.host);
        Some(rpassword::prompt_password(prompt)?)
    } else {
        args.password.clone()
    };

    let target = HostTarget::new(
        &args.host,
        args.port,
        &args.user,
        password.map(SecretString::from),
        args.key.clone(),
    )?;

    Ok(RemoteHost::new(target, settings)?)
}

fn target_params(args: &RemoteTargetArgs) -> Vec<(&'static str, String)> {
    let auth = if args.key.is_some() { "key" } else { "password" };
    vec![
        ("host", args.host.clone()),
        ("user", args.user.clone()),
        ("port", args.port.to_string()),
        ("auth", auth.to_string()),
    ]
}

fn print_outcome(outcome: &TransferOutcome) {
    let (verb, arrow) = match outcome.direction {
        Direction::Download => ("Downloaded", "->"),
        Direction::Upload => ("Uploaded", "<-"),
    };
    println!(
        "{GREEN}{BOLD}✓{RESET} {verb} {} bytes: {} {arrow} {} (via {})",
        outcome.bytes,
        outcome.remote_path,
        outcome.local_path.display(),
        outcome.method,
    );
    if let Some(backup) = &outcome.backup_path {
        println!("  Backup: {backup}");
    }
    if let Some(diagnostic) = &outcome.diagnostic {
        println!("  {YELLOW}Note:{RESET} {diagnostic}");
    }
}
