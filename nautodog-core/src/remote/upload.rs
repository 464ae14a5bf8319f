//! Upload with backup, staging and elevated publish.

use std::path::Path;

use chrono::Local;

use super::classify;
use super::host::RemoteHost;
use super::outcome::{Direction, TransferMethod, TransferOutcome};
use super::ownership::OwnershipSnapshot;
use super::predicate::RemotePredicate;
use super::shell;
use super::transport::{Connector, FileChannel};
use crate::config::BackupPolicy;
use crate::error::{RemoteHostError, RemoteResult};

/// Format of the suffix appended to backup file names
const BACKUP_STAMP: &str = "%Y%m%d%H%M%S";

/// Format of per-upload scratch directory names
const SCRATCH_STAMP: &str = "%Y%m%d%H%M%S%6f";

impl<C: Connector> RemoteHost<C> {
    /// Publishes a local file at `remote_path`
    ///
    /// An existing target is copied into a `backup_files` directory next to
    /// it first. The new file is staged in a scratch directory, moved into
    /// place with elevated privileges and given the previous owner, group
    /// and mode. The scratch directory is removed on every path once it
    /// exists.
    ///
    /// # Errors
    ///
    /// - `NotFound` when `local_path` is missing (no session is opened)
    /// - `Permission` when the target directory cannot be created, the move
    ///   leaves no file behind, or a backup fails under
    ///   [`BackupPolicy::Required`]
    /// - `Transfer` when staging fails
    /// - `Connection` when the session or sub-channel cannot be opened
    pub fn upload_file(&mut self, local_path: &Path, remote_path: &str) -> RemoteResult<TransferOutcome> {
        if !local_path.is_file() {
            return Err(RemoteHostError::NotFound(format!(
                "local file {} does not exist",
                local_path.display()
            )));
        }
        let local_path = std::path::absolute(local_path).map_err(|e| RemoteHostError::io(local_path, e))?;

        let span = tracing::info_span!("remote.upload", host = %self.target().host, remote_path);
        let _guard = span.enter();

        let mut scope = self.session()?;
        let host = scope.target().host.clone();
        let mut channel = scope
            .open_sub_channel()
            .map_err(|e| RemoteHostError::connection(&host, format!("sub-channel not available: {e}")))?;

        let target_dir = shell::parent_dir(remote_path);
        scope.ensure_directory(&mut channel, &target_dir)?;

        let mut snapshot = None;
        let backup_path = if channel_exists(&mut channel, remote_path) {
            snapshot = scope.ownership_snapshot(remote_path);
            match scope.backup_existing(&mut channel, remote_path, &target_dir, snapshot.as_ref()) {
                Ok(path) => {
                    tracing::info!(backup = %path, "Backed up existing file");
                    Some(path)
                }
                Err(e) => match scope.settings().backup_policy {
                    BackupPolicy::Required => return Err(e),
                    BackupPolicy::Advisory => {
                        tracing::warn!(error = %e, "Backup failed, continuing without one");
                        None
                    }
                },
            }
        } else {
            tracing::debug!("No existing file at {remote_path}, skipping backup");
            None
        };

        let scratch_dir = shell::join(
            &scope.settings().scratch_root,
            &Local::now().format(SCRATCH_STAMP).to_string(),
        );
        let mkdir = scope.execute(&shell::mkdir_p(&scratch_dir))?;
        if let Some(reason) = classify::step_failure(&mkdir.as_exec()) {
            return Err(RemoteHostError::Transfer(format!(
                "could not create scratch directory {scratch_dir}: {reason}"
            )));
        }

        let published = scope.stage_and_publish(&mut channel, &local_path, remote_path, &scratch_dir, snapshot.as_ref());
        scope.remove_scratch(&scratch_dir);
        let (bytes, diagnostic) = published?;

        tracing::info!(bytes, "Uploaded {} to {remote_path}", local_path.display());
        Ok(TransferOutcome {
            direction: Direction::Upload,
            local_path,
            remote_path: remote_path.to_string(),
            method: TransferMethod::SubChannel,
            bytes,
            backup_path,
            diagnostic,
        })
    }

    fn ensure_directory<F: FileChannel>(&mut self, channel: &mut F, dir: &str) -> RemoteResult<()> {
        if channel_exists(channel, dir) {
            return Ok(());
        }

        tracing::info!("Creating remote directory {dir}");
        let output = self.execute(&shell::mkdir_p(dir))?;

        if channel_exists(channel, dir) {
            Ok(())
        } else {
            Err(RemoteHostError::Permission(format!(
                "could not create remote directory {dir}: {}",
                output.text.trim()
            )))
        }
    }

    fn ownership_snapshot(&mut self, path: &str) -> Option<OwnershipSnapshot> {
        let output = match self.execute(&shell::stat_ownership(path)) {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(error = %e, "Could not query ownership of {path}");
                return None;
            }
        };
        let snapshot = OwnershipSnapshot::parse(&output.text);
        if snapshot.is_none() {
            tracing::warn!(output = %output.text.trim(), "Could not read ownership of {path}");
        }
        snapshot
    }

    fn backup_existing<F: FileChannel>(
        &mut self,
        channel: &mut F,
        remote_path: &str,
        target_dir: &str,
        snapshot: Option<&OwnershipSnapshot>,
    ) -> RemoteResult<String> {
        let backup_dir = shell::join(target_dir, &self.settings().backup_dir_name);
        let mkdir = self.execute(&shell::mkdir_p(&backup_dir))?;
        if let Some(reason) = classify::step_failure(&mkdir.as_exec()) {
            return Err(RemoteHostError::Permission(format!(
                "could not create backup directory {backup_dir}: {reason}"
            )));
        }

        let stem = format!(
            "{}_{}",
            shell::file_name(remote_path),
            Local::now().format(BACKUP_STAMP)
        );
        let backup_path = unique_path(channel, &backup_dir, &stem)?;

        let copy = shell::copy(remote_path, &backup_path);
        let plain = self.execute(&copy)?;
        if let Some(reason) = classify::copy_failure(&plain.as_exec()) {
            tracing::debug!(%reason, "Plain copy failed, retrying elevated");
            let elevated = self.execute_elevated(&copy)?;
            if let Some(reason) = classify::copy_failure(&elevated.as_exec()) {
                return Err(RemoteHostError::Permission(format!(
                    "could not back up {remote_path} to {backup_path}: {reason}"
                )));
            }
        }

        if let Some(snapshot) = snapshot {
            self.apply_ownership(snapshot, &backup_path)
                .map_err(|reason| {
                    RemoteHostError::Permission(format!(
                        "could not restore ownership of backup {backup_path}: {reason}"
                    ))
                })?;
        }

        Ok(backup_path)
    }

    fn stage_and_publish<F: FileChannel>(
        &mut self,
        channel: &mut F,
        local_path: &Path,
        remote_path: &str,
        scratch_dir: &str,
        snapshot: Option<&OwnershipSnapshot>,
    ) -> RemoteResult<(u64, Option<String>)> {
        let staged = shell::join(scratch_dir, shell::file_name(remote_path));
        let bytes = channel
            .upload(local_path, &staged)
            .map_err(|e| RemoteHostError::Transfer(format!("staging to {staged} failed: {e}")))?;

        let moved = self.execute_elevated(&shell::move_file(&staged, remote_path))?;
        let mut diagnostic = None;
        if let Some(reason) = classify::move_failure(&moved.as_exec()) {
            let check = RemotePredicate::file_exists_elevated(remote_path, self.elevation());
            let outcome = self.evaluate(&check)?;
            if !outcome.value {
                return Err(RemoteHostError::Permission(format!(
                    "move to {remote_path} failed: {reason}; existence check: {}",
                    outcome.output.trim()
                )));
            }
            tracing::warn!(%reason, "Move reported failure but {remote_path} is in place");
            diagnostic = Some(format!("move reported failure but destination exists: {reason}"));
        }

        if let Some(snapshot) = snapshot {
            if let Err(reason) = self.apply_ownership(snapshot, remote_path) {
                tracing::warn!(%reason, "Could not restore ownership of {remote_path}");
            }
        }

        Ok((bytes, diagnostic))
    }

    /// Elevated chown then chmod; returns the first failure
    fn apply_ownership(&mut self, snapshot: &OwnershipSnapshot, path: &str) -> Result<(), String> {
        let commands = [
            shell::chown(&snapshot.owner, &snapshot.group, path),
            shell::chmod(&snapshot.mode, path),
        ];
        for command in &commands {
            let output = self.execute_elevated(command).map_err(|e| e.to_string())?;
            if let Some(reason) = classify::step_failure(&output.as_exec()) {
                return Err(reason);
            }
        }
        Ok(())
    }

    fn remove_scratch(&mut self, scratch_dir: &str) {
        match self.execute(&shell::remove_tree(scratch_dir)) {
            Ok(output) => {
                if let Some(reason) = classify::step_failure(&output.as_exec()) {
                    tracing::warn!(%reason, "Could not remove scratch directory {scratch_dir}");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Could not remove scratch directory {scratch_dir}"),
        }
    }
}

/// Existence check where sub-channel errors count as absent
fn channel_exists<F: FileChannel>(channel: &mut F, path: &str) -> bool {
    channel.exists(path).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Existence check on {path} failed");
        false
    })
}

/// `dir/stem`, or `dir/stem_N` with the first free `N`
///
/// A name whose existence cannot be checked is never treated as free.
fn unique_path<F: FileChannel>(channel: &mut F, dir: &str, stem: &str) -> RemoteResult<String> {
    let mut candidate = shell::join(dir, stem);
    let mut n = 1u32;
    loop {
        match channel.exists(&candidate) {
            Ok(false) => return Ok(candidate),
            Ok(true) => {
                candidate = shell::join(dir, &format!("{stem}_{n}"));
                n += 1;
            }
            Err(e) => {
                return Err(RemoteHostError::Permission(format!(
                    "could not check backup name {candidate}: {e}"
                )));
            }
        }
    }
}
