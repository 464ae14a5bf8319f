//! Download with privileged fallback.

use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::classify;
use super::host::RemoteHost;
use super::outcome::{Direction, TransferMethod, TransferOutcome};
use super::predicate::RemotePredicate;
use super::shell;
use super::transport::{Connector, FileChannel, RemoteSession, SubChannelError};
use crate::error::{RemoteHostError, RemoteResult};

impl<C: Connector> RemoteHost<C> {
    /// Copies a remote file to the local filesystem
    ///
    /// Without `local_path` the file lands in `<cwd>/<download_dir>/<name>`.
    /// SFTP is tried first; if it is unavailable or fails, the file is read
    /// once with an elevated `cat`. The destination is only replaced once
    /// one of the two reads has completed, so a failed download leaves any
    /// previous file untouched.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the probe reports the file missing or unreadable
    /// - `Permission` when the privileged read fails
    /// - `Connection` when the session cannot be established
    /// - `Io` when the local destination cannot be written
    pub fn download_file(
        &mut self,
        remote_path: &str,
        local_path: Option<&Path>,
    ) -> RemoteResult<TransferOutcome> {
        let span = tracing::info_span!("remote.download", host = %self.target().host, remote_path);
        let _guard = span.enter();

        let mut scope = self.session()?;

        let probe = scope.evaluate(&RemotePredicate::readable_file(remote_path))?;
        if !probe.value {
            return Err(RemoteHostError::NotFound(format!(
                "remote file {remote_path} does not exist or is not readable (probe output: {})",
                probe.output.trim()
            )));
        }

        let base = std::env::current_dir().map_err(|e| RemoteHostError::io(".", e))?;
        let destination = resolve_destination(
            &base,
            scope.settings().download_dir.as_path(),
            remote_path,
            local_path,
        )?;
        tracing::info!(destination = %destination.display(), "Downloading {remote_path}");

        let staging = staging_file(&destination)?;
        let sub_channel = match scope.open_sub_channel() {
            Ok(mut channel) => channel.download(remote_path, staging.path()),
            Err(e) => Err(e),
        };

        let (method, bytes, diagnostic) = match sub_channel {
            Ok(bytes) => (TransferMethod::SubChannel, bytes, None),
            Err(e) => {
                match &e {
                    SubChannelError::Unavailable(reason) => {
                        tracing::warn!(%reason, "SFTP unavailable, falling back to privileged read");
                    }
                    SubChannelError::Failed(reason) => {
                        tracing::warn!(%reason, "SFTP download failed, falling back to privileged read");
                    }
                }
                let bytes = scope.privileged_read(remote_path, staging.path())?;
                (TransferMethod::PrivilegedShell, bytes, Some(e.to_string()))
            }
        };

        staging
            .persist(&destination)
            .map_err(|e| RemoteHostError::io(&destination, e.error))?;

        Ok(TransferOutcome {
            direction: Direction::Download,
            local_path: destination,
            remote_path: remote_path.to_string(),
            method,
            bytes,
            backup_path: None,
            diagnostic,
        })
    }

    /// Opens the file sub-channel on the active session
    pub(crate) fn open_sub_channel(
        &mut self,
    ) -> Result<<C::Session as RemoteSession>::Channel, SubChannelError> {
        self.active_session()
            .ok_or_else(|| SubChannelError::Unavailable("no active session".into()))?
            .open_file_channel()
    }

    fn privileged_read(&mut self, remote_path: &str, destination: &Path) -> RemoteResult<u64> {
        let command = self.elevation().apply(&shell::cat(remote_path));
        let output = self.execute_raw(&command).map_err(|e| {
            RemoteHostError::Permission(format!("privileged read of {remote_path} failed: {e}"))
        })?;

        if let Some(reason) = classify::privileged_read_failure(&output, &self.target().user) {
            return Err(RemoteHostError::Permission(format!(
                "privileged read of {remote_path} failed: {reason}"
            )));
        }

        std::fs::write(destination, &output.output)
            .map_err(|e| RemoteHostError::io(destination, e))?;
        Ok(output.output.len() as u64)
    }
}

/// Hidden temporary file next to `destination`
///
/// Bytes land here first and are renamed over `destination` only once the
/// transfer has completed; dropping it on an error path removes it.
fn staging_file(destination: &Path) -> RemoteResult<NamedTempFile> {
    let parent = destination.parent().unwrap_or_else(|| Path::new("."));
    tempfile::Builder::new()
        .prefix(".nautodog-")
        .suffix(".part")
        .tempfile_in(parent)
        .map_err(|e| RemoteHostError::io(parent, e))
}

/// Absolute local destination, with its parent directory created
///
/// Relative paths are taken relative to `base`.
fn resolve_destination(
    base: &Path,
    download_dir: &Path,
    remote_path: &str,
    local_path: Option<&Path>,
) -> RemoteResult<PathBuf> {
    let destination = match local_path {
        Some(path) => base.join(path),
        None => {
            let name = shell::file_name(remote_path);
            if name.is_empty() {
                return Err(RemoteHostError::Config(format!(
                    "cannot derive a file name from remote path '{remote_path}'"
                )));
            }
            base.join(download_dir).join(name)
        }
    };

    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent).map_err(|e| RemoteHostError::io(parent, e))?;
    }
    Ok(destination)
}
