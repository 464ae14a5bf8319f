//! Error types for the Nautodog core library.
//!
//! Each domain has its own `thiserror` enum; [`NautodogError`] aggregates
//! them for callers that cross module boundaries.

use std::path::PathBuf;

use thiserror::Error;

use crate::tracing::TracingError;

/// Errors raised while loading or querying the YAML configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// The configuration file exists but could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// The document root is a scalar or a sequence
    #[error("Configuration root must be a mapping, found {0}")]
    NotAMapping(String),

    /// A dotted key path does not resolve
    #[error("Configuration key '{0}' is not defined")]
    MissingKey(String),

    /// A path segment addressing a list is not an integer
    #[error("Configuration list index '{segment}' is not an integer for path '{path}'")]
    InvalidIndex {
        /// Offending segment
        segment: String,
        /// Full dotted path
        path: String,
    },

    /// A list index is past the end of the list
    #[error("Configuration list index '{segment}' out of range for path '{path}'")]
    IndexOutOfRange {
        /// Offending segment
        segment: String,
        /// Full dotted path
        path: String,
    },

    /// A subtree could not be converted into the requested type
    #[error("Invalid configuration value at '{path}': {reason}")]
    Deserialize {
        /// Full dotted path
        path: String,
        /// Deserializer message
        reason: String,
    },

    /// The configuration could not be serialized
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// `instance()` was called before `initialize()`
    #[error("ConfigManager is not initialized. Call config::initialize() first")]
    NotInitialized,

    /// `initialize()` was called again with another file
    #[error(
        "ConfigManager already initialized with {current}; use force_reload to switch to {requested}"
    )]
    AlreadyInitialized {
        /// Path of the active configuration
        current: PathBuf,
        /// Path passed to the rejected call
        requested: PathBuf,
    },

    /// A setting has an unusable value
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

/// Failure kinds raised by remote host operations
///
/// Diagnostics embed raw remote output and are meant for humans.
#[derive(Debug, Error)]
pub enum RemoteHostError {
    /// Invalid construction parameters, never retried
    #[error("Invalid remote host configuration: {0}")]
    Config(String),

    /// Authentication, timeout or transport failure
    #[error("Connection to {host} failed: {reason}")]
    Connection {
        /// Remote host name or address
        host: String,
        /// Cause of the failure
        reason: String,
    },

    /// Remote source missing or unreadable, or local source missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// A privileged step failed after its single elevated attempt
    #[error("Permission denied: {0}")]
    Permission(String),

    /// The staged transfer did not complete
    #[error("Transfer failed: {0}")]
    Transfer(String),

    /// A remote predicate printed neither of its markers
    #[error("Unexpected output from `{command}`: {output:?}")]
    UnexpectedOutput {
        /// Command that was run
        command: String,
        /// Raw output
        output: String,
    },

    /// Local filesystem failure
    #[error("Local I/O error on {}: {source}", .path.display())]
    Io {
        /// Local path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl RemoteHostError {
    /// Creates a connection error for `host`
    pub fn connection(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connection {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Creates a local I/O error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true for connection-class failures
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Errors raised while preparing SNMP credential checks
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnmpError {
    /// Authentication protocol name is not recognized
    #[error("Unknown SNMP authentication protocol: {0}")]
    UnknownAuthProtocol(String),

    /// Privacy protocol name is not recognized
    #[error("Unknown SNMP privacy protocol: {0}")]
    UnknownPrivProtocol(String),

    /// The credential combination is not usable
    #[error("Invalid SNMP credentials: {0}")]
    InvalidCredentials(String),
}

/// Top-level error type for the Nautodog core library
#[derive(Debug, Error)]
pub enum NautodogError {
    /// Configuration failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Remote host failure
    #[error(transparent)]
    Remote(#[from] RemoteHostError),

    /// SNMP credential preparation failure
    #[error(transparent)]
    Snmp(#[from] SnmpError),

    /// Logging initialization failure
    #[error(transparent)]
    Tracing(#[from] TracingError),

    /// I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the Nautodog core library
pub type Result<T> = std::result::Result<T, NautodogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for remote host operations
pub type RemoteResult<T> = std::result::Result<T, RemoteHostError>;
