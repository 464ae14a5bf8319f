//! Integration tests for file-backed configuration

use std::io::Write;

use nautodog_core::config::{BackupPolicy, ConfigManager, TransferSettings};
use nautodog_core::error::ConfigError;
use serde_yaml::Value;

const DOCUMENT: &str = r"
devices:
  - name: core-sw-01
    host: 10.0.0.1
  - name: edge-rtr-02
    host: 10.0.0.2
snmp:
  community: public
remote:
  backup_policy: required
  elevation_prefix: sudo -n
";

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_file_and_resolves_nested_paths() {
    let file = write_config(DOCUMENT);
    let config = ConfigManager::load(file.path()).unwrap();

    assert_eq!(config.path(), file.path());
    assert_eq!(config.get("devices.1.name").unwrap(), Value::from("edge-rtr-02"));
    assert_eq!(config.get("snmp.community").unwrap(), Value::from("public"));
    assert_eq!(
        config.top_level().iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
        vec!["devices", "snmp", "remote"]
    );
}

#[test]
fn misses_are_counted_and_cleared_by_reload() {
    let file = write_config(DOCUMENT);
    let config = ConfigManager::load(file.path()).unwrap();

    assert!(config.get("snmp.v3.user").is_err());
    assert!(config.get("snmp.v3.user").is_err());
    assert_eq!(config.get_or("devices.9.host", Value::from("none")), Value::from("none"));
    assert!(config.get_untracked("not.tracked").is_none());

    let missing = config.missing_keys();
    assert_eq!(missing.len(), 2);
    assert_eq!(missing[0].path, "devices.9.host");
    assert_eq!(missing[0].attempts, 1);
    assert_eq!(missing[1].path, "snmp.v3.user");
    assert_eq!(missing[1].attempts, 2);

    config.reload().unwrap();
    assert!(config.missing_keys().is_empty());
}

#[test]
fn reload_picks_up_changes() {
    let file = write_config(DOCUMENT);
    let config = ConfigManager::load(file.path()).unwrap();
    let first_load = config.last_loaded();

    std::fs::write(file.path(), "snmp:\n  community: private\n").unwrap();
    config.reload().unwrap();

    assert_eq!(config.get("snmp.community").unwrap(), Value::from("private"));
    assert!(config.last_loaded() >= first_load);
}

#[test]
fn transfer_settings_come_from_remote_section() {
    let file = write_config(DOCUMENT);
    let config = ConfigManager::load(file.path()).unwrap();

    let settings = TransferSettings::from_config(&config).unwrap();

    assert_eq!(settings.backup_policy, BackupPolicy::Required);
    assert_eq!(settings.elevation_prefix, "sudo -n");
    assert_eq!(settings.backup_dir_name, "backup_files");
}

#[test]
fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigManager::load(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn non_mapping_root_is_rejected() {
    let file = write_config("- just\n- a list\n");
    assert!(matches!(
        ConfigManager::load(file.path()),
        Err(ConfigError::NotAMapping(_))
    ));
}

#[test]
fn serializes_to_yaml_and_json() {
    let config = ConfigManager::from_yaml_str(DOCUMENT).unwrap();

    let json: serde_json::Value = serde_json::from_str(&config.to_json().unwrap()).unwrap();
    assert_eq!(json["devices"][0]["host"], "10.0.0.1");

    let reparsed = ConfigManager::from_yaml_str(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(reparsed.snapshot(), config.snapshot());
}
