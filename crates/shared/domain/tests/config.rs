use serde_json::json;
use std::path::PathBuf;
use tether_domain::config::{
    HardwareConfig, IamConfig, RuntimeMode, StorageConfig, TetherConfig, VmConfig,
};
use tether_domain::permissions::UnknownActionPolicy;

#[test]
fn config_defaults_are_sane() {
    let storage = StorageConfig::default();
    assert_eq!(storage.activation_path(), PathBuf::from("data/activation.json"));
    assert_eq!(storage.permissions_path(), PathBuf::from("data/permissions.json"));

    assert_eq!(HardwareConfig::default().timeout_ms, 5_000);

    let iam = IamConfig::default();
    assert_eq!(iam.session_ttl_secs, 3_600);
    assert_eq!(iam.unknown_action, UnknownActionPolicy::Allow);

    assert!(VmConfig::default().enabled);

    let cfg = TetherConfig::default();
    assert_eq!(cfg.mode, RuntimeMode::Development);
    assert!(cfg.logging.level.is_none());
}

#[test]
fn tether_config_deserializes_partial_sections() {
    let raw = json!({
        "mode": "production",
        "storage": { "data_dir": "/var/lib/tether" },
        "iam": { "unknown_action": "deny" },
        "vm": { "enabled": false },
        "logging": { "level": "trace", "json": true }
    });

    let cfg: TetherConfig = serde_json::from_value(raw).expect("config deserialize");
    assert!(cfg.mode.is_production());
    assert_eq!(cfg.storage.activation_path(), PathBuf::from("/var/lib/tether/activation.json"));
    assert_eq!(cfg.iam.unknown_action, UnknownActionPolicy::Deny);
    assert_eq!(cfg.iam.session_ttl_secs, 3_600);
    assert!(!cfg.vm.enabled);
    assert_eq!(cfg.logging.level.as_deref(), Some("trace"));
    assert!(cfg.logging.json);
    assert_eq!(cfg.hardware.timeout_ms, 5_000);
}

#[test]
fn mode_drives_default_log_level() {
    assert_eq!(RuntimeMode::Production.default_log_level(), "warn");
    assert_eq!(RuntimeMode::Development.default_log_level(), "debug");
    assert_eq!(RuntimeMode::Test.default_log_level(), "info");
}

#[test]
fn clones_share_until_mutated() {
    let base = TetherConfig::default();
    let mut changed = base.clone();
    changed.vm.enabled = false;
    assert!(base.vm.enabled);
    assert!(!changed.vm.enabled);
}
