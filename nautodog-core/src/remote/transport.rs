//! Transport seams between the orchestration logic and the wire.
//!
//! [`RemoteHost`](super::RemoteHost) drives any [`Connector`]; the SSH
//! implementation lives in [`super::ssh`].

use std::path::Path;

use thiserror::Error;

use super::target::HostTarget;

/// Failure of the session transport itself
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// TCP connect, handshake or timeout failure
    #[error("connect failed: {0}")]
    Connect(String),

    /// The server rejected the credential
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Host key missing from or mismatching the known hosts file
    #[error("host key verification failed: {0}")]
    HostKey(String),

    /// Opening or driving an exec channel failed
    #[error("channel error: {0}")]
    Channel(String),
}

/// Failure of the secure file sub-channel
///
/// The two variants let callers choose a fallback explicitly instead of
/// treating every failure alike.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubChannelError {
    /// The sub-channel could not be opened on this session
    #[error("sub-channel unavailable: {0}")]
    Unavailable(String),

    /// The sub-channel opened but the operation failed part-way
    #[error("sub-channel transfer failed: {0}")]
    Failed(String),
}

/// Raw result of one remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// stdout and stderr, merged in arrival order
    pub output: Vec<u8>,
    /// Exit status when the transport reports one
    pub exit_status: Option<i32>,
}

impl ExecOutput {
    /// Creates an output with a known exit status
    pub fn new(output: impl Into<Vec<u8>>, exit_status: Option<i32>) -> Self {
        Self {
            output: output.into(),
            exit_status,
        }
    }

    /// Output decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

/// Factory for authenticated sessions
pub trait Connector {
    /// Session type produced by this connector
    type Session: RemoteSession;

    /// Opens and authenticates a new session to `target`
    ///
    /// # Errors
    ///
    /// Returns a transport error on connect, handshake, host key or
    /// authentication failure.
    fn connect(&self, target: &HostTarget) -> Result<Self::Session, TransportError>;
}

/// One authenticated connection
pub trait RemoteSession {
    /// Sub-channel type opened on this session
    type Channel: FileChannel;

    /// Liveness check; `false` means the session must be recreated
    fn is_alive(&mut self) -> bool;

    /// Runs `command` and collects its merged output
    ///
    /// # Errors
    ///
    /// Returns a transport error if the command could not be sent or its
    /// output could not be read.
    fn exec(&mut self, command: &str) -> Result<ExecOutput, TransportError>;

    /// Interactive prompt that trails command output, if the transport
    /// echoes one
    fn prompt(&self) -> Option<&str> {
        None
    }

    /// Opens the secure file sub-channel
    ///
    /// The channel is owned so commands can keep running while it is open.
    ///
    /// # Errors
    ///
    /// Returns [`SubChannelError::Unavailable`] if the server does not
    /// offer the sub-channel.
    fn open_file_channel(&mut self) -> Result<Self::Channel, SubChannelError>;

    /// Closes the session
    ///
    /// # Errors
    ///
    /// Returns a transport error if the disconnect message fails.
    fn close(&mut self) -> Result<(), TransportError>;
}

/// Binary-safe file operations over a session
pub trait FileChannel {
    /// Whether `path` exists (file or directory)
    ///
    /// # Errors
    ///
    /// Returns [`SubChannelError::Failed`] for errors other than "no such
    /// file".
    fn exists(&mut self, path: &str) -> Result<bool, SubChannelError>;

    /// Copies remote `remote_path` into local `local_path`, returning the
    /// byte count
    ///
    /// # Errors
    ///
    /// Returns [`SubChannelError::Failed`] on any read or write failure.
    fn download(&mut self, remote_path: &str, local_path: &Path) -> Result<u64, SubChannelError>;

    /// Copies local `local_path` into remote `remote_path`, returning the
    /// byte count
    ///
    /// # Errors
    ///
    /// Returns [`SubChannelError::Failed`] on any read or write failure.
    fn upload(&mut self, local_path: &Path, remote_path: &str) -> Result<u64, SubChannelError>;
}
