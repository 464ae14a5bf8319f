//! Remote host address and credentials.

use std::fmt;
use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::{RemoteHostError, RemoteResult};

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Authentication material for a remote host
///
/// Exactly one mode is ever present; [`HostTarget::new`] enforces this.
#[derive(Clone)]
pub enum Credential {
    /// Password authentication
    Password(SecretString),
    /// Private key file authentication
    KeyFile(PathBuf),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password(_) => f.write_str("Password(***)"),
            Self::KeyFile(path) => f.debug_tuple("KeyFile").field(path).finish(),
        }
    }
}

/// Address, login and credential of a remote device
#[derive(Debug, Clone)]
pub struct HostTarget {
    /// Hostname or IP address
    pub host: String,
    /// SSH port
    pub port: u16,
    /// Login user
    pub user: String,
    /// Authentication mode
    pub credential: Credential,
}

impl HostTarget {
    /// Builds a target from optional password and key inputs
    ///
    /// # Errors
    ///
    /// Returns a configuration error when both or neither of `password`
    /// and `ssh_key_path` are given, or when `host` or `user` is empty.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: Option<SecretString>,
        ssh_key_path: Option<PathBuf>,
    ) -> RemoteResult<Self> {
        let host = host.into();
        let user = user.into();

        if host.trim().is_empty() {
            return Err(RemoteHostError::Config("host must not be empty".into()));
        }
        if user.trim().is_empty() {
            return Err(RemoteHostError::Config("user must not be empty".into()));
        }

        let credential = match (password, ssh_key_path) {
            (Some(password), None) => Credential::Password(password),
            (None, Some(path)) => Credential::KeyFile(expand_key_path(path)),
            (Some(_), Some(_)) => {
                return Err(RemoteHostError::Config(
                    "provide either a password or an SSH key path, not both".into(),
                ));
            }
            (None, None) => {
                return Err(RemoteHostError::Config(
                    "either a password or an SSH key path is required".into(),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            user,
            credential,
        })
    }

    /// Builds a password-authenticated target
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty host or user.
    pub fn with_password(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: SecretString,
    ) -> RemoteResult<Self> {
        Self::new(host, port, user, Some(password), None)
    }

    /// Builds a key-authenticated target
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty host or user.
    pub fn with_key(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        ssh_key_path: impl Into<PathBuf>,
    ) -> RemoteResult<Self> {
        Self::new(host, port, user, None, Some(ssh_key_path.into()))
    }

    /// `user@host:port` label for logs
    pub fn display_name(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.port)
    }
}

fn expand_key_path(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
        None => path,
    }
}
