//! Placeholder device commands.
//!
//! These commands only echo their name and argument until the device
//! workflows behind them exist.

use crate::cli::{
    DdAgentCommands, DdMainConfigCommands, DdMonitorCommands, DdSnmpConfigCommands, NameArgs,
    ReportCommands,
};
use crate::error::CliError;

use super::log_command;

/// SNMP configuration command handler
pub fn cmd_ddsnmpconfig(command: &DdSnmpConfigCommands) -> Result<(), CliError> {
    let (name, args) = match command {
        DdSnmpConfigCommands::AddSnmpV3(args) => ("addsnmpv3", args),
        DdSnmpConfigCommands::AddSnmpV2(args) => ("addsnmpv2", args),
        DdSnmpConfigCommands::UploadCustomProfile(args) => ("uploadcustopprofile", args),
        DdSnmpConfigCommands::CreateLocalConfig(args) => ("createlocalconfig", args),
        DdSnmpConfigCommands::VerifyDevices(args) => ("verifydevices", args),
        DdSnmpConfigCommands::AutodiscoveryV2(args) => ("autodiscoveryv2", args),
        DdSnmpConfigCommands::AutodiscoveryV3(args) => ("autodiscoveryv3", args),
        DdSnmpConfigCommands::RollbackConfig(args) => ("rollbackconfig", args),
        DdSnmpConfigCommands::RevokeDevice(args) => ("revokedevice", args),
    };
    log_command(&format!("nautodog ddsnmpconfig {name}"), &params(args));
    println!("[INFO] Executing command function: {name}");
    echo(name, args);
    Ok(())
}

/// Monitor command handler
pub fn cmd_ddmonitor(command: &DdMonitorCommands) -> Result<(), CliError> {
    let (name, args) = match command {
        DdMonitorCommands::AddReachableMonitor(args) => ("addreachablemonitor", args),
        DdMonitorCommands::AddInterfaceMonitor(args) => ("addinterfacemonitor", args),
        DdMonitorCommands::AddMonitorsByRules(args) => ("addmonitorsbyrules", args),
    };
    run_stub("ddmonitor", name, args)
}

/// Main configuration command handler
pub fn cmd_ddmainconfig(command: &DdMainConfigCommands) -> Result<(), CliError> {
    let (name, args) = match command {
        DdMainConfigCommands::AddTag(args) => ("addtag", args),
        DdMainConfigCommands::ApiKey(args) => ("apikey", args),
    };
    run_stub("ddmainconfig", name, args)
}

/// Agent command handler
pub fn cmd_ddagent(command: &DdAgentCommands) -> Result<(), CliError> {
    let (name, args) = match command {
        DdAgentCommands::Status(args) => ("ddastatus", args),
        DdAgentCommands::Errors(args) => ("ddaerrors", args),
        DdAgentCommands::Logs(args) => ("ddalogs", args),
        DdAgentCommands::AgentUploadConfigs(args) => ("dduploadconfigs", args),
        DdAgentCommands::AgentDownloadConfigs(args) => ("dddownloadconfigs", args),
        DdAgentCommands::ConfigConsistency(args) => ("configconsistency", args),
        DdAgentCommands::DownloadConfigs(args) => ("downloadconfigs", args),
        DdAgentCommands::UploadConfigs(args) => ("uploadconfigs", args),
    };
    run_stub("ddagent", name, args)
}

/// Report command handler
pub fn cmd_report(command: &ReportCommands) -> Result<(), CliError> {
    let (name, args) = match command {
        ReportCommands::NdReportDevices(args) => ("ndreport-devices", args),
        ReportCommands::SldReportDevices(args) => ("sldreport-devices", args),
        ReportCommands::MonitorCoverage(args) => ("ddreportmonitorcoverage", args),
    };
    run_stub("report", name, args)
}

fn run_stub(group: &str, name: &str, args: &NameArgs) -> Result<(), CliError> {
    log_command(&format!("nautodog {group} {name}"), &params(args));
    echo(name, args);
    Ok(())
}

fn params(args: &NameArgs) -> [(&'static str, String); 1] {
    [("name", args.name.clone())]
}

fn echo(name: &str, args: &NameArgs) {
    println!("Command: {name}, Name: {}", args.name);
}
