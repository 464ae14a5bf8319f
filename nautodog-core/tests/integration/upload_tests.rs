//! Integration tests for uploads

use std::path::PathBuf;

use nautodog_core::remote::{Direction, TransferMethod};
use nautodog_core::{BackupPolicy, RemoteHostError, TransferSettings};
use tempfile::TempDir;

use crate::common::{FakeFile, FakeRemote, SESSION_USER};

const TARGET: &str = "/remote/target_dir/file.txt";
const BACKUP_DIR: &str = "/remote/target_dir/backup_files";
const SCRATCH_ROOT: &str = "/tmp/nautodog_uploads";

fn local_source(content: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.txt");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

fn remote_with_target() -> FakeRemote {
    FakeRemote::new().with_file(TARGET, FakeFile::new(b"v1", "alice", "staff", "644"))
}

fn is_backup_name(name: &str) -> bool {
    name.strip_prefix("file.txt_")
        .is_some_and(|stamp| stamp.len() >= 14 && stamp[..14].chars().all(|c| c.is_ascii_digit()))
}

// ========== Publish With Backup ==========

#[test]
fn upload_replaces_file_and_keeps_backup() {
    let remote = remote_with_target();
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");

    let outcome = host.upload_file(&source, TARGET).unwrap();

    assert_eq!(outcome.direction, Direction::Upload);
    assert_eq!(outcome.method, TransferMethod::SubChannel);
    assert_eq!(outcome.bytes, 2);
    assert!(outcome.diagnostic.is_none());

    let published = remote.file(TARGET).unwrap();
    assert_eq!(published.content, b"v2");
    assert_eq!(published.owner, "alice");
    assert_eq!(published.group, "staff");
    assert_eq!(published.mode, "644");

    let state = remote.state();
    let backups = state.files_under(BACKUP_DIR);
    assert_eq!(backups.len(), 1);
    let (path, backup) = backups[0];
    let name = path.rsplit('/').next().unwrap();
    assert!(is_backup_name(name), "unexpected backup name {name}");
    assert_eq!(outcome.backup_path.as_deref(), Some(path.as_str()));
    assert_eq!(backup.content, b"v1");
    assert_eq!(backup.owner, "alice");
    assert_eq!(backup.group, "staff");
    assert_eq!(backup.mode, "644");

    assert!(state.dirs_under(SCRATCH_ROOT).is_empty());
    assert_eq!(state.live_sessions(), 0);
}

#[test]
fn upload_twice_keeps_two_distinct_backups() {
    let remote = remote_with_target();
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");
    let (_dir3, source3) = local_source("v3");

    let first = host.upload_file(&source, TARGET).unwrap();
    let second = host.upload_file(&source3, TARGET).unwrap();

    assert_ne!(first.backup_path, second.backup_path);

    let state = remote.state();
    let backups = state.files_under(BACKUP_DIR);
    assert_eq!(backups.len(), 2);
    let mut contents: Vec<&[u8]> = backups.iter().map(|(_, f)| f.content.as_slice()).collect();
    contents.sort_unstable();
    assert_eq!(contents, vec![b"v1".as_slice(), b"v2".as_slice()]);
    assert_eq!(state.files.get(TARGET).unwrap().content, b"v3");
}

#[test]
fn upload_of_new_file_skips_backup() {
    let remote = FakeRemote::new().with_dir("/remote/target_dir");
    let mut host = remote.host();
    let (_dir, source) = local_source("fresh");

    let outcome = host.upload_file(&source, TARGET).unwrap();

    assert!(outcome.backup_path.is_none());
    let state = remote.state();
    assert!(!state.dirs.contains(BACKUP_DIR));
    assert!(state.commands_matching("chown").is_empty());
    let published = state.files.get(TARGET).unwrap();
    assert_eq!(published.content, b"fresh");
    assert_eq!(published.owner, SESSION_USER);
}

#[test]
fn upload_creates_missing_target_directory() {
    let remote = FakeRemote::new();
    let mut host = remote.host();
    let (_dir, source) = local_source("v1");

    host.upload_file(&source, "/opt/app/conf/app.yaml").unwrap();

    let state = remote.state();
    assert!(state.dirs.contains("/opt/app/conf"));
    assert_eq!(state.files.get("/opt/app/conf/app.yaml").unwrap().content, b"v1");
}

// ========== Directory And Publish Failures ==========

#[test]
fn upload_fails_when_directory_cannot_be_created() {
    let remote = FakeRemote::new().knobs(|k| k.deny_mkdir = true);
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");

    let err = host.upload_file(&source, TARGET).unwrap_err();

    assert!(matches!(err, RemoteHostError::Permission(_)));
    assert!(err.to_string().contains("/remote/target_dir"));

    let state = remote.state();
    assert_eq!(state.sftp_uploads, 0);
    assert!(!state.dirs.contains(SCRATCH_ROOT));
    assert!(state.dirs_under(SCRATCH_ROOT).is_empty());
    assert_eq!(state.live_sessions(), 0);
}

#[test]
fn upload_accepts_false_negative_move_report() {
    let remote = remote_with_target().knobs(|k| k.mv_reports_failure_but_succeeds = true);
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");

    let outcome = host.upload_file(&source, TARGET).unwrap();

    assert!(outcome.diagnostic.unwrap().contains("destination exists"));
    assert_eq!(remote.file(TARGET).unwrap().content, b"v2");
    let state = remote.state();
    assert_eq!(state.commands_matching("sudo test -f").len(), 1);
    assert!(state.dirs_under(SCRATCH_ROOT).is_empty());
}

#[test]
fn upload_fails_when_move_leaves_nothing() {
    let remote = FakeRemote::new()
        .with_dir("/remote/target_dir")
        .knobs(|k| k.mv_fails = true);
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");

    let err = host.upload_file(&source, TARGET).unwrap_err();

    assert!(matches!(err, RemoteHostError::Permission(_)));
    let message = err.to_string();
    assert!(message.contains("mv: cannot move"));
    assert!(message.contains("NOT_EXISTS"));

    let state = remote.state();
    assert!(state.files.get(TARGET).is_none());
    assert_eq!(state.commands_matching("rm -rf").len(), 1);
    assert!(state.dirs_under(SCRATCH_ROOT).is_empty());
    assert_eq!(state.live_sessions(), 0);
}

#[test]
fn upload_staging_failure_is_transfer_error() {
    let remote = remote_with_target().knobs(|k| k.sftp_put_fails = true);
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");

    let err = host.upload_file(&source, TARGET).unwrap_err();

    assert!(matches!(err, RemoteHostError::Transfer(_)));
    assert_eq!(remote.file(TARGET).unwrap().content, b"v1");
    assert!(remote.state().dirs_under(SCRATCH_ROOT).is_empty());
}

#[test]
fn upload_without_sub_channel_is_connection_error() {
    let remote = remote_with_target().knobs(|k| k.sftp_unavailable = true);
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");

    let err = host.upload_file(&source, TARGET).unwrap_err();

    assert!(err.is_connection());
    assert!(err.to_string().contains("sub-channel not available"));
    assert_eq!(remote.state().live_sessions(), 0);
}

#[test]
fn upload_of_missing_local_file_opens_no_session() {
    let remote = remote_with_target();
    let mut host = remote.host();
    let connects_before = remote.state().connects;

    let err = host
        .upload_file(std::path::Path::new("/nonexistent/source.txt"), TARGET)
        .unwrap_err();

    assert!(matches!(err, RemoteHostError::NotFound(_)));
    assert_eq!(remote.state().connects, connects_before);
}

// ========== Backup Policy ==========

#[test]
fn backup_retries_copy_with_elevation() {
    let remote = remote_with_target().knobs(|k| k.plain_cp_denied = true);
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");

    let outcome = host.upload_file(&source, TARGET).unwrap();

    assert!(outcome.backup_path.is_some());
    let state = remote.state();
    assert_eq!(state.commands_matching("sudo cp").len(), 1);
    let backups = state.files_under(BACKUP_DIR);
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].1.owner, "alice");
}

#[test]
fn advisory_backup_failure_still_publishes() {
    let remote = remote_with_target().knobs(|k| {
        k.plain_cp_denied = true;
        k.sudo_cp_denied = true;
    });
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");

    let outcome = host.upload_file(&source, TARGET).unwrap();

    assert!(outcome.backup_path.is_none());
    let published = remote.file(TARGET).unwrap();
    assert_eq!(published.content, b"v2");
    assert_eq!(published.owner, "alice");
    assert!(remote.state().files_under(BACKUP_DIR).is_empty());
}

#[test]
fn required_backup_failure_aborts_before_staging() {
    let remote = remote_with_target().knobs(|k| {
        k.plain_cp_denied = true;
        k.sudo_cp_denied = true;
    });
    let settings = TransferSettings::default().with_backup_policy(BackupPolicy::Required);
    let mut host = remote.host_with(settings);
    let (_dir, source) = local_source("v2");

    let err = host.upload_file(&source, TARGET).unwrap_err();

    assert!(matches!(err, RemoteHostError::Permission(_)));
    let state = remote.state();
    assert_eq!(state.files.get(TARGET).unwrap().content, b"v1");
    assert_eq!(state.sftp_uploads, 0);
    assert_eq!(state.live_sessions(), 0);
}

fn remote_with_unreadable_backups() -> FakeRemote {
    remote_with_target()
        .with_file(
            "/remote/target_dir/backup_files/file.txt_20240101000000",
            FakeFile::new(b"v0", "root", "root", "600"),
        )
        .knobs(|k| k.stat_denied_under = Some(format!("{BACKUP_DIR}/")))
}

#[test]
fn unchecked_backup_name_is_not_reused() {
    let remote = remote_with_unreadable_backups();
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");

    let outcome = host.upload_file(&source, TARGET).unwrap();

    assert!(outcome.backup_path.is_none());
    assert_eq!(remote.file(TARGET).unwrap().content, b"v2");
    let state = remote.state();
    let backups = state.files_under(BACKUP_DIR);
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].1.content, b"v0");
}

#[test]
fn required_backup_fails_when_backup_name_cannot_be_checked() {
    let remote = remote_with_unreadable_backups();
    let settings = TransferSettings::default().with_backup_policy(BackupPolicy::Required);
    let mut host = remote.host_with(settings);
    let (_dir, source) = local_source("v2");

    let err = host.upload_file(&source, TARGET).unwrap_err();

    assert!(matches!(err, RemoteHostError::Permission(_)));
    assert!(err.to_string().contains("backup name"));
    let state = remote.state();
    assert_eq!(state.files.get(TARGET).unwrap().content, b"v1");
    assert_eq!(state.sftp_uploads, 0);
}

#[test]
fn required_backup_fails_when_ownership_cannot_be_restored() {
    let remote = remote_with_target().knobs(|k| k.chown_fails = true);
    let settings = TransferSettings::default().with_backup_policy(BackupPolicy::Required);
    let mut host = remote.host_with(settings);
    let (_dir, source) = local_source("v2");

    let err = host.upload_file(&source, TARGET).unwrap_err();

    assert!(matches!(err, RemoteHostError::Permission(_)));
    assert!(err.to_string().contains("ownership"));
}

#[test]
fn malformed_stat_output_skips_ownership_restore() {
    let remote = remote_with_target().knobs(|k| k.stat_garbage = true);
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");

    let outcome = host.upload_file(&source, TARGET).unwrap();

    assert!(outcome.backup_path.is_some());
    let state = remote.state();
    assert!(state.commands_matching("chown").is_empty());
    assert_eq!(state.files.get(TARGET).unwrap().owner, SESSION_USER);
}

#[test]
fn upload_failure_to_restore_final_ownership_is_advisory() {
    let remote = remote_with_target().knobs(|k| k.chown_fails = true);
    let mut host = remote.host();
    let (_dir, source) = local_source("v2");

    let outcome = host.upload_file(&source, TARGET).unwrap();

    assert!(outcome.backup_path.is_none());
    assert_eq!(remote.file(TARGET).unwrap().content, b"v2");
}

#[test]
fn paths_with_spaces_and_quotes_are_quoted() {
    let target = "/remote/it's a dir/my file.conf";
    let remote = FakeRemote::new().with_file(target, FakeFile::new(b"old", "root", "root", "600"));
    let mut host = remote.host();
    let (_dir, source) = local_source("new");

    host.upload_file(&source, target).unwrap();

    let state = remote.state();
    let published = state.files.get(target).unwrap();
    assert_eq!(published.content, b"new");
    assert_eq!(published.mode, "600");
    assert_eq!(state.files_under("/remote/it's a dir/backup_files").len(), 1);
}
