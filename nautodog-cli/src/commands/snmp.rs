//! SNMP credential check commands.

use std::time::Duration;

use nautodog_core::snmp::{
    AuthProtocol, CheckReport, CheckSummary, CredentialChecker, NetSnmpChecker, PrivProtocol,
    SnmpV2Credentials, SnmpV3Credentials, check_batch_v2,
};
use secrecy::SecretString;

use crate::cli::{SnmpCommands, SnmpEndpointArgs};
use crate::error::CliError;

use super::log_command;

/// SNMP command handler
pub fn cmd_snmp(command: SnmpCommands) -> Result<(), CliError> {
    match command {
        SnmpCommands::CheckV2 {
            hosts,
            community,
            concurrency,
            endpoint,
        } => {
            log_command(
                "nautodog snmp check-v2",
                &[
                    ("hosts", hosts.join(",")),
                    ("port", endpoint.port.to_string()),
                    ("timeout", endpoint.timeout.to_string()),
                    ("retries", endpoint.retries.to_string()),
                ],
            );
            cmd_check_v2(&hosts, community, concurrency, &endpoint)
        }
        SnmpCommands::CheckV3 {
            host,
            user,
            auth_key,
            priv_key,
            auth_protocol,
            priv_protocol,
            endpoint,
        } => {
            log_command(
                "nautodog snmp check-v3",
                &[
                    ("host", host.clone()),
                    ("user", user.clone()),
                    ("auth_protocol", auth_protocol.clone()),
                    ("priv_protocol", priv_protocol.clone()),
                    ("port", endpoint.port.to_string()),
                ],
            );

            let auth_protocol: AuthProtocol = auth_protocol.parse()?;
            let priv_protocol: PrivProtocol = priv_protocol.parse()?;

            let mut credentials = SnmpV3Credentials::new(host, user)
                .with_port(endpoint.port)
                .with_timeout(Duration::from_secs(endpoint.timeout))
                .with_retries(endpoint.retries);
            if let Some(key) = auth_key {
                credentials = credentials.with_auth(SecretString::from(key), auth_protocol);
            }
            if let Some(key) = priv_key {
                credentials = credentials.with_priv(SecretString::from(key), priv_protocol);
            }

            let checker = NetSnmpChecker::with_program(&endpoint.snmpget);
            let runtime = runtime()?;
            let report = runtime.block_on(checker.check_v3(&credentials))?;
            finish_single(&report, endpoint.json)
        }
    }
}

fn cmd_check_v2(
    hosts: &[String],
    community: String,
    concurrency: usize,
    endpoint: &SnmpEndpointArgs,
) -> Result<(), CliError> {
    let credentials: Vec<SnmpV2Credentials> = hosts
        .iter()
        .map(|host| {
            SnmpV2Credentials::new(host.clone(), SecretString::from(community.clone()))
                .with_port(endpoint.port)
                .with_timeout(Duration::from_secs(endpoint.timeout))
                .with_retries(endpoint.retries)
        })
        .collect();

    let checker = NetSnmpChecker::with_program(&endpoint.snmpget);
    let runtime = runtime()?;

    if let [single] = credentials.as_slice() {
        let report = runtime.block_on(checker.check_v2(single))?;
        return finish_single(&report, endpoint.json);
    }

    if !endpoint.json {
        println!("Checking {} agents...\n", credentials.len());
    }
    let summary = runtime.block_on(check_batch_v2(&checker, &credentials, concurrency));

    if endpoint.json {
        print_json(&summary)?;
    } else {
        let mut reports: Vec<&CheckReport> = summary.reports.iter().collect();
        reports.sort_by(|a, b| a.host.cmp(&b.host));
        for report in reports {
            print_report(report);
        }
        println!();
        print_summary(&summary);
    }

    if summary.has_failures() {
        return Err(CliError::CheckFailed(format!(
            "{} of {} checks failed",
            summary.failed, summary.total
        )));
    }
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Config(format!("Failed to create async runtime: {e}")))
}

fn finish_single(report: &CheckReport, json: bool) -> Result<(), CliError> {
    if json {
        print_json(report)?;
    } else {
        print_report(report);
    }
    if report.success {
        Ok(())
    } else {
        Err(CliError::CheckFailed(
            report
                .diagnostic
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string()),
        ))
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::Output(format!("Failed to serialize report: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Print a single check report with colors
fn print_report(report: &CheckReport) {
    const GREEN: &str = "\x1b[32m";
    const RED: &str = "\x1b[31m";
    const CYAN: &str = "\x1b[36m";
    const RESET: &str = "\x1b[0m";
    const BOLD: &str = "\x1b[1m";

    if report.success {
        print!("{GREEN}{BOLD}✓{RESET} {}", report.host);
        if let Some(response) = &report.response {
            print!(" {CYAN}{response}{RESET}");
        }
        println!();
    } else {
        print!("{RED}{BOLD}✗{RESET} {}", report.host);
        if let Some(diagnostic) = &report.diagnostic {
            print!(" - {RED}{diagnostic}{RESET}");
        }
        println!();
    }
}

/// Print the batch summary
fn print_summary(summary: &CheckSummary) {
    const RED: &str = "\x1b[31m";
    const RESET: &str = "\x1b[0m";
    const BOLD: &str = "\x1b[1m";

    println!("{BOLD}Check Summary:{RESET} {}", summary.summary_string());
    for report in summary.failed_reports() {
        println!("  {RED}{}{RESET}", report.host);
    }
}
