//! Nautodog Core Library
//!
//! This crate provides the core functionality behind the `nautodog` CLI:
//! remote host file transfer with privilege escalation, YAML configuration
//! management and SNMP credential checks.
//!
//! # Crate Structure
//!
//! - [`remote`] - SSH session management, sentinel probes, download with
//!   privileged fallback, upload with backup and elevated publish
//! - [`config`] - YAML configuration manager (process-wide singleton) and
//!   transfer settings
//! - [`snmp`] - SNMPv2c/v3 credential validation via net-snmp
//! - [`tracing`] - Structured logging initialization
//! - [`error`] - Error types shared across modules

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod remote;
pub mod snmp;
pub mod tracing;

pub use config::{ConfigManager, MissingKey, TransferSettings};
pub use error::{ConfigError, NautodogError, RemoteHostError, Result, SnmpError};
pub use remote::{
    BackupPolicy, Credential, Direction, HostTarget, RemoteHost, RemotePredicate, TransferMethod,
    TransferOutcome,
};
pub use snmp::{
    AuthProtocol, CheckReport, CheckSummary, CredentialChecker, NetSnmpChecker, PrivProtocol,
    SecurityLevel, SnmpV2Credentials, SnmpV3Credentials,
};
