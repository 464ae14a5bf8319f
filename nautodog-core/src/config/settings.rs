//! Remote transfer settings.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::manager::{ConfigManager, deserialize_value};
use crate::error::{ConfigError, ConfigResult};

/// Configuration section holding [`TransferSettings`]
pub const REMOTE_SECTION: &str = "remote";

/// What to do when the pre-upload backup cannot be made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupPolicy {
    /// Log a warning and publish without a backup
    #[default]
    Advisory,
    /// Abort the upload with a permission error
    Required,
}

/// Tunables for remote sessions, downloads and uploads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSettings {
    /// TCP connect and handshake timeout in seconds
    pub connect_timeout_secs: u64,
    /// Per-command blocking timeout in seconds (0 disables it)
    pub command_timeout_secs: u64,
    /// Prefix used for privileged commands
    pub elevation_prefix: String,
    /// Download directory, relative to the working directory, used when no
    /// destination is given
    pub download_dir: PathBuf,
    /// Name of the backup directory created next to upload targets
    pub backup_dir_name: String,
    /// Remote root for per-upload scratch directories
    pub scratch_root: String,
    /// Handling of backup failures
    pub backup_policy: BackupPolicy,
    /// Reject hosts missing from `known_hosts_file`
    pub strict_host_key_checking: bool,
    /// OpenSSH known_hosts file (defaults to `~/.ssh/known_hosts`)
    pub known_hosts_file: Option<PathBuf>,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            command_timeout_secs: 30,
            elevation_prefix: "sudo".to_string(),
            download_dir: PathBuf::from("temp_downloads"),
            backup_dir_name: "backup_files".to_string(),
            scratch_root: "/tmp/nautodog_uploads".to_string(),
            backup_policy: BackupPolicy::Advisory,
            strict_host_key_checking: false,
            known_hosts_file: None,
        }
    }
}

impl TransferSettings {
    /// Creates settings with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backup policy
    #[must_use]
    pub const fn with_backup_policy(mut self, policy: BackupPolicy) -> Self {
        self.backup_policy = policy;
        self
    }

    /// Sets the download directory
    #[must_use]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Sets the privilege escalation prefix
    #[must_use]
    pub fn with_elevation_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.elevation_prefix = prefix.into();
        self
    }

    /// Sets the connect timeout in seconds
    #[must_use]
    pub const fn with_connect_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Connect timeout as a `Duration`
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Command timeout, `None` when disabled
    pub const fn command_timeout(&self) -> Option<Duration> {
        if self.command_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.command_timeout_secs))
        }
    }

    /// Known hosts file with `~` expanded
    pub fn known_hosts_path(&self) -> Option<PathBuf> {
        match &self.known_hosts_file {
            Some(path) => Some(PathBuf::from(
                shellexpand::tilde(&path.to_string_lossy()).into_owned(),
            )),
            None => dirs::home_dir().map(|home| home.join(".ssh").join("known_hosts")),
        }
    }

    /// Checks values that would produce broken remote commands
    ///
    /// # Errors
    ///
    /// Returns `InvalidSetting` describing the first problem found.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting(
                "connect_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.backup_dir_name.is_empty() || self.backup_dir_name.contains('/') {
            return Err(ConfigError::InvalidSetting(format!(
                "backup_dir_name must be a single path component, got '{}'",
                self.backup_dir_name
            )));
        }
        if !self.scratch_root.starts_with('/') {
            return Err(ConfigError::InvalidSetting(format!(
                "scratch_root must be an absolute remote path, got '{}'",
                self.scratch_root
            )));
        }
        if self.download_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidSetting(
                "download_dir must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Reads the `remote` section, using defaults when it is absent
    ///
    /// # Errors
    ///
    /// Returns `Deserialize` for a malformed section or `InvalidSetting`
    /// when validation fails.
    pub fn from_config(config: &ConfigManager) -> ConfigResult<Self> {
        let settings = match config.get_untracked(REMOTE_SECTION) {
            Some(value) => deserialize_value::<Self>(REMOTE_SECTION, value)?,
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }
}
