//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use nautodog_core::remote::DEFAULT_SSH_PORT;
use nautodog_core::snmp::{DEFAULT_CONCURRENCY, DEFAULT_RETRIES, DEFAULT_SNMP_PORT, DEFAULT_TIMEOUT_SECS};

/// Nautodog command-line interface for SNMP-monitored network devices
#[derive(Parser)]
#[command(name = "nautodog")]
#[command(author, version, about = "Nautodog CLI application")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warning, error)
    #[arg(long, global = true, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Log line format
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Commands for SNMP configuration
    #[command(subcommand)]
    Ddsnmpconfig(DdSnmpConfigCommands),

    /// Commands for device monitoring
    #[command(subcommand)]
    Ddmonitor(DdMonitorCommands),

    /// Commands for main configuration
    #[command(subcommand)]
    Ddmainconfig(DdMainConfigCommands),

    /// Commands for the monitoring agent
    #[command(subcommand)]
    Ddagent(DdAgentCommands),

    /// Commands for reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Transfer files to and from a remote device
    #[command(subcommand, about = "Check, download from and upload to a remote host over SSH")]
    Remote(RemoteCommands),

    /// Validate SNMP credentials against agents
    #[command(subcommand, about = "Validate SNMPv2c and SNMPv3 credentials")]
    Snmp(SnmpCommands),

    /// Inspect the configuration file
    #[command(subcommand, about = "Inspect the YAML configuration")]
    Config(ConfigCommands),

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate man page
    #[command(about = "Generate man page to stdout")]
    Manpage,
}

/// Arguments shared by placeholder device commands
#[derive(Args, Debug, Clone)]
pub struct NameArgs {
    /// Name to use
    #[arg(short, long)]
    pub name: String,
}

/// SNMP configuration commands
#[derive(Subcommand)]
pub enum DdSnmpConfigCommands {
    /// Add SNMPv3 credentials for a device
    #[command(name = "addsnmpv3")]
    AddSnmpV3(NameArgs),
    /// Add SNMPv2c credentials for a device
    #[command(name = "addsnmpv2")]
    AddSnmpV2(NameArgs),
    /// Upload a custom profile
    #[command(name = "uploadcustopprofile")]
    UploadCustomProfile(NameArgs),
    /// Create a local configuration
    #[command(name = "createlocalconfig")]
    CreateLocalConfig(NameArgs),
    /// Verify devices
    #[command(name = "verifydevices")]
    VerifyDevices(NameArgs),
    /// Run SNMPv2c autodiscovery
    #[command(name = "autodiscoveryv2")]
    AutodiscoveryV2(NameArgs),
    /// Run SNMPv3 autodiscovery
    #[command(name = "autodiscoveryv3")]
    AutodiscoveryV3(NameArgs),
    /// Roll back a configuration
    #[command(name = "rollbackconfig")]
    RollbackConfig(NameArgs),
    /// Revoke a device
    #[command(name = "revokedevice")]
    RevokeDevice(NameArgs),
}

/// Monitor commands
#[derive(Subcommand)]
pub enum DdMonitorCommands {
    /// Add a reachability monitor
    #[command(name = "addreachablemonitor")]
    AddReachableMonitor(NameArgs),
    /// Add an interface monitor
    #[command(name = "addinterfacemonitor")]
    AddInterfaceMonitor(NameArgs),
    /// Add monitors from rules
    #[command(name = "addmonitorsbyrules")]
    AddMonitorsByRules(NameArgs),
}

/// Main configuration commands
#[derive(Subcommand)]
pub enum DdMainConfigCommands {
    /// Add a tag
    #[command(name = "addtag")]
    AddTag(NameArgs),
    /// Manage the API key
    #[command(name = "apikey")]
    ApiKey(NameArgs),
}

/// Agent commands
#[derive(Subcommand)]
pub enum DdAgentCommands {
    /// Show agent status
    #[command(name = "ddastatus")]
    Status(NameArgs),
    /// Show agent errors
    #[command(name = "ddaerrors")]
    Errors(NameArgs),
    /// Show agent logs
    #[command(name = "ddalogs")]
    Logs(NameArgs),
    /// Upload agent configurations
    #[command(name = "dduploadconfigs")]
    AgentUploadConfigs(NameArgs),
    /// Download agent configurations
    #[command(name = "dddownloadconfigs")]
    AgentDownloadConfigs(NameArgs),
    /// Check configuration consistency
    #[command(name = "configconsistency")]
    ConfigConsistency(NameArgs),
    /// Download configurations
    #[command(name = "downloadconfigs")]
    DownloadConfigs(NameArgs),
    /// Upload configurations
    #[command(name = "uploadconfigs")]
    UploadConfigs(NameArgs),
}

/// Report commands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Network device report
    #[command(name = "ndreport-devices")]
    NdReportDevices(NameArgs),
    /// SLD device report
    #[command(name = "sldreport-devices")]
    SldReportDevices(NameArgs),
    /// Monitor coverage report
    #[command(name = "ddreportmonitorcoverage")]
    MonitorCoverage(NameArgs),
}

/// Remote host address and credential options
#[derive(Args, Debug, Clone)]
pub struct RemoteTargetArgs {
    /// Host address (hostname or IP)
    #[arg(short = 'H', long)]
    pub host: String,

    /// Login user
    #[arg(short, long)]
    pub user: String,

    /// SSH port
    #[arg(short, long, default_value_t = DEFAULT_SSH_PORT)]
    pub port: u16,

    /// Login password
    #[arg(long, env = "NAUTODOG_SSH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Prompt for the login password
    #[arg(long, conflicts_with = "password")]
    pub ask_password: bool,

    /// Private key file
    #[arg(short, long)]
    pub key: Option<PathBuf>,
}

/// Remote host subcommands
#[derive(Subcommand)]
pub enum RemoteCommands {
    /// Open and close a session to verify the credentials
    Check {
        #[command(flatten)]
        target: RemoteTargetArgs,
    },

    /// Download a remote file, falling back to a privileged read
    Download {
        #[command(flatten)]
        target: RemoteTargetArgs,

        /// Remote file path
        remote: String,

        /// Local destination (defaults to the download directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a file, backing up and replacing the remote copy
    Upload {
        #[command(flatten)]
        target: RemoteTargetArgs,

        /// Local source file
        local: PathBuf,

        /// Remote destination path
        remote: String,

        /// Abort when the existing remote file cannot be backed up
        #[arg(long)]
        require_backup: bool,
    },
}

/// Agent endpoint options shared by SNMP checks
#[derive(Args, Debug, Clone)]
pub struct SnmpEndpointArgs {
    /// UDP port of the agent
    #[arg(long, default_value_t = DEFAULT_SNMP_PORT)]
    pub port: u16,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Retries after the first request
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// snmpget executable to run
    #[arg(long, default_value = "snmpget")]
    pub snmpget: String,

    /// Print reports as JSON
    #[arg(long)]
    pub json: bool,
}

/// SNMP subcommands
#[derive(Subcommand)]
pub enum SnmpCommands {
    /// Check an SNMPv2c community against one or more agents
    #[command(name = "check-v2")]
    CheckV2 {
        /// Agent address, may be repeated
        #[arg(short = 'H', long = "host", required = true)]
        hosts: Vec<String>,

        /// Community string
        #[arg(long, env = "NAUTODOG_SNMP_COMMUNITY", hide_env_values = true)]
        community: String,

        /// Maximum checks in flight
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        #[command(flatten)]
        endpoint: SnmpEndpointArgs,
    },

    /// Check SNMPv3 USM credentials against an agent
    #[command(name = "check-v3")]
    CheckV3 {
        /// Agent address
        #[arg(short = 'H', long)]
        host: String,

        /// USM user name
        #[arg(short, long)]
        user: String,

        /// Authentication key
        #[arg(long, env = "NAUTODOG_SNMP_AUTH_KEY", hide_env_values = true)]
        auth_key: Option<String>,

        /// Privacy key
        #[arg(long, env = "NAUTODOG_SNMP_PRIV_KEY", hide_env_values = true)]
        priv_key: Option<String>,

        /// Authentication protocol (MD5, SHA, SHA-256, usmHMACSHAAuthProtocol, ...)
        #[arg(long, default_value = "MD5")]
        auth_protocol: String,

        /// Privacy protocol (DES, AES, AES-256, usmAesCfb128Protocol, ...)
        #[arg(long, default_value = "DES")]
        priv_protocol: String,

        #[command(flatten)]
        endpoint: SnmpEndpointArgs,
    },
}

/// Output format for configuration dumps
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum DumpFormat {
    /// YAML document
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the whole configuration
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: DumpFormat,
    },

    /// Print the value at a dotted key path
    Get {
        /// Dotted key path, e.g. `devices.0.host`
        key: String,
    },

    /// Look up keys and report the ones that are not defined
    Missing {
        /// Dotted key paths to look up
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Print the configuration file path
    Path,
}
