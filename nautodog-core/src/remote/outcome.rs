//! Results of successful transfers.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Remote to local
    Download,
    /// Local to remote
    Upload,
}

/// How the bytes travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMethod {
    /// Secure file sub-channel (SFTP)
    SubChannel,
    /// Elevated shell command
    PrivilegedShell,
}

impl fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubChannel => write!(f, "sftp"),
            Self::PrivilegedShell => write!(f, "privileged shell"),
        }
    }
}

/// Description of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    /// Direction of the transfer
    pub direction: Direction,
    /// Absolute local path
    pub local_path: PathBuf,
    /// Remote path
    pub remote_path: String,
    /// Transfer mechanism used
    pub method: TransferMethod,
    /// Bytes transferred
    pub bytes: u64,
    /// Backup of the previous remote file, uploads only
    pub backup_path: Option<String>,
    /// Notes about recovered problems
    pub diagnostic: Option<String>,
}
