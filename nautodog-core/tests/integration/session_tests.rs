//! Integration tests for session handling, probing and command execution

use std::path::PathBuf;

use nautodog_core::remote::{HostTarget, RemoteHost, RemotePredicate};
use nautodog_core::{RemoteHostError, TransferSettings};

use crate::common::{FakeFile, FakeRemote, Knobs, target};

// ========== Construction ==========

#[test]
fn credential_exclusivity_is_enforced() {
    let both = HostTarget::new(
        "device.example",
        22,
        "netops",
        Some("secret".into()),
        Some(PathBuf::from("/home/netops/.ssh/id_ed25519")),
    );
    assert!(matches!(both, Err(RemoteHostError::Config(_))));

    let neither = HostTarget::new("device.example", 22, "netops", None, None);
    assert!(matches!(neither, Err(RemoteHostError::Config(_))));
}

#[test]
fn construction_checks_connection_and_releases_it() {
    let remote = FakeRemote::new();
    let host = remote.host();

    assert!(!host.is_connected());
    let state = remote.state();
    assert_eq!(state.connects, 1);
    assert_eq!(state.closes, 1);
}

#[test]
fn construction_fails_when_connection_fails() {
    let remote = FakeRemote::new().knobs(|k| k.connect_fails = true);

    let result = RemoteHost::with_connector(target(), TransferSettings::default(), remote.connector());

    let Err(err) = result else {
        panic!("construction should fail");
    };
    assert!(err.is_connection());
    assert!(err.to_string().contains("Initial connection check failed"));
}

#[test]
fn construction_rejects_invalid_settings() {
    let remote = FakeRemote::new();
    let settings = TransferSettings::default().with_download_dir("");

    let result = RemoteHost::with_connector(target(), settings, remote.connector());

    assert!(matches!(result, Err(RemoteHostError::Config(_))));
    assert_eq!(remote.state().connects, 0);
}

// ========== Connect / Disconnect ==========

#[test]
fn connect_reuses_live_session() {
    let remote = FakeRemote::new();
    let mut host = remote.host();

    host.connect().unwrap();
    host.connect().unwrap();
    assert!(host.is_connected());
    assert_eq!(remote.state().connects, 2);

    host.disconnect();
    host.disconnect();
    assert!(!host.is_connected());
    assert_eq!(remote.state().closes, 2);
}

#[test]
fn dropping_host_closes_session() {
    let remote = FakeRemote::new();
    {
        let mut host = remote.host();
        host.connect().unwrap();
        assert_eq!(remote.state().live_sessions(), 1);
    }
    assert_eq!(remote.state().live_sessions(), 0);
}

#[test]
fn session_scope_disconnects_on_drop() {
    let remote = FakeRemote::new();
    let mut host = remote.host();
    {
        let mut scope = host.session().unwrap();
        assert_eq!(scope.run("echo hi").unwrap(), "hi\n");
    }
    assert!(!host.is_connected());
    assert_eq!(remote.state().live_sessions(), 0);
}

// ========== Execution ==========

#[test]
fn execute_requires_active_session() {
    let remote = FakeRemote::new();
    let mut host = remote.host();

    let err = host.run("echo hi").unwrap_err();

    assert!(err.is_connection());
    assert!(err.to_string().contains("no active session"));
}

#[test]
fn execute_keeps_exit_status() {
    let remote = FakeRemote::new();
    let mut host = remote.host();
    host.connect().unwrap();

    let output = host.execute("cat '/nope'").unwrap();
    assert_eq!(output.exit_status, Some(1));
    assert!(output.text.contains("No such file or directory"));

    let output = host.execute_elevated("echo ok").unwrap();
    assert_eq!(output.exit_status, Some(0));
    assert!(remote.state().commands.iter().any(|c| c == "sudo echo ok"));
}

#[test]
fn custom_elevation_prefix_is_used() {
    let remote = FakeRemote::new();
    let settings = TransferSettings::default().with_elevation_prefix("sudo -n");
    let mut host = remote.host_with(settings);
    host.connect().unwrap();

    host.execute_elevated("echo ok").unwrap();

    assert!(remote.state().commands.iter().any(|c| c == "sudo -n echo ok"));
}

// ========== Probing ==========

#[test]
fn probe_reports_readable_and_missing_files() {
    let remote = FakeRemote::new()
        .with_file("/etc/snmp/snmpd.conf", FakeFile::new(b"rocommunity public", "root", "root", "644"))
        .with_file("/etc/shadow", FakeFile::new(b"x", "root", "shadow", "640").unreadable());
    let mut host = remote.host();
    host.connect().unwrap();

    assert!(host.probe("/etc/snmp/snmpd.conf").unwrap());
    assert!(!host.probe("/etc/snmp/missing.conf").unwrap());
    assert!(!host.probe("/etc/shadow").unwrap());
    assert!(!host.probe("/etc/snmp").unwrap());
}

#[test]
fn predicate_without_marker_is_unexpected_output() {
    let remote = FakeRemote::new().knobs(|k| k.sudo_password_prompt = true);
    let mut host = remote.host();
    host.connect().unwrap();

    let predicate = RemotePredicate::file_exists_elevated("/etc/hosts", host.elevation());
    let err = host.evaluate(&predicate).unwrap_err();

    assert!(matches!(err, RemoteHostError::UnexpectedOutput { .. }));
}

// ========== Session Release ==========

fn failing_setups() -> Vec<(&'static str, Knobs)> {
    let mut setups = vec![("none", Knobs::default())];
    let mut add = |name: &'static str, f: fn(&mut Knobs)| {
        let mut knobs = Knobs::default();
        f(&mut knobs);
        setups.push((name, knobs));
    };
    add("sftp_unavailable", |k| k.sftp_unavailable = true);
    add("sftp_get_fails", |k| k.sftp_get_fails = true);
    add("sftp_put_fails", |k| k.sftp_put_fails = true);
    add("deny_mkdir", |k| k.deny_mkdir = true);
    add("cp_denied", |k| {
        k.plain_cp_denied = true;
        k.sudo_cp_denied = true;
    });
    add("mv_fails", |k| k.mv_fails = true);
    add("mv_false_negative", |k| k.mv_reports_failure_but_succeeds = true);
    add("sudo_prompt", |k| k.sudo_password_prompt = true);
    add("stat_garbage", |k| k.stat_garbage = true);
    add("chown_fails", |k| k.chown_fails = true);
    add("no_exit_status", |k| k.no_exit_status = true);
    setups
}

#[test]
fn every_transfer_releases_its_session_once() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.txt");
    std::fs::write(&source, "v2").unwrap();

    for (name, knobs) in failing_setups() {
        for remote_path in ["/remote/target_dir/file.txt", "/remote/absent/new.txt", "/remote/missing.txt"] {
            let remote = FakeRemote::new()
                .with_file("/remote/target_dir/file.txt", FakeFile::new(b"v1", "alice", "staff", "644"));
            let mut host = remote.host();
            remote.state().knobs = knobs.clone();

            let before = remote.state().connects;
            let _ = host.download_file(remote_path, Some(&dir.path().join("out.txt")));
            {
                let state = remote.state();
                assert_eq!(state.connects, before + 1, "{name}: download of {remote_path}");
                assert_eq!(state.live_sessions(), 0, "{name}: download of {remote_path}");
            }

            let _ = host.upload_file(&source, remote_path);
            let state = remote.state();
            assert_eq!(state.connects, before + 2, "{name}: upload to {remote_path}");
            assert_eq!(state.live_sessions(), 0, "{name}: upload to {remote_path}");
            assert!(!host.is_connected());
        }
    }
}
