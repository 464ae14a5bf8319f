//! CLI error types and exit codes.

use nautodog_core::error::{ConfigError, NautodogError, RemoteHostError, SnmpError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, or other non-connection errors
    pub const GENERAL_ERROR: i32 = 1;
    /// Connection failure - a session could not be established or a
    /// credential check failed
    pub const CONNECTION_FAILURE: i32 = 2;
    /// Remote failure - missing remote file, denied privileged step or
    /// interrupted transfer
    pub const REMOTE_FAILURE: i32 = 3;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Remote file operation error
    #[error("Remote operation failed: {0}")]
    Remote(String),

    /// SNMP credential check failed
    #[error("SNMP check failed: {0}")]
    CheckFailed(String),

    /// Output serialization error
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RemoteHostError> for CliError {
    fn from(err: RemoteHostError) -> Self {
        match err {
            RemoteHostError::Config(reason) => Self::InvalidArgument(reason),
            RemoteHostError::Connection { .. } => Self::Connection(err.to_string()),
            RemoteHostError::Io { .. } => Self::Io(std::io::Error::other(err.to_string())),
            RemoteHostError::NotFound(_)
            | RemoteHostError::Permission(_)
            | RemoteHostError::Transfer(_)
            | RemoteHostError::UnexpectedOutput { .. } => Self::Remote(err.to_string()),
        }
    }
}

impl From<SnmpError> for CliError {
    fn from(err: SnmpError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<NautodogError> for CliError {
    fn from(err: NautodogError) -> Self {
        match err {
            NautodogError::Config(e) => e.into(),
            NautodogError::Remote(e) => e.into(),
            NautodogError::Snmp(e) => e.into(),
            NautodogError::Tracing(e) => Self::Config(e.to_string()),
            NautodogError::Io(e) => Self::Io(e),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, arguments, output, IO)
    /// - 2: Connection failure or failed credential check
    /// - 3: Remote file or permission failure
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Connection(_) | Self::CheckFailed(_) => exit_codes::CONNECTION_FAILURE,
            Self::Remote(_) => exit_codes::REMOTE_FAILURE,
            Self::Config(_) | Self::InvalidArgument(_) | Self::Output(_) | Self::Io(_) => {
                exit_codes::GENERAL_ERROR
            }
        }
    }
}
