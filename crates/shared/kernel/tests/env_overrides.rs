use tether_kernel::config::load_config_with_env;
use tether_kernel::domain::config::{RuntimeMode, TetherConfig};
use tether_kernel::domain::permissions::UnknownActionPolicy;

fn env(pairs: &[(&str, &str)]) -> config::Map<String, String> {
    pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
}

#[test]
fn environment_overrides_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tether.toml");
    std::fs::write(&path, "mode = \"development\"\n[hardware]\ntimeout_ms = 100\n").unwrap();

    let overrides = env(&[
        ("TETHER__MODE", "production"),
        ("TETHER__HARDWARE__TIMEOUT_MS", "2500"),
        ("TETHER__STORAGE__DATA_DIR", "/srv/tether"),
        ("TETHER__IAM__UNKNOWN_ACTION", "deny"),
    ]);

    let cfg: TetherConfig = load_config_with_env(Some(&path), Some(overrides)).unwrap();
    assert_eq!(cfg.mode, RuntimeMode::Production);
    assert_eq!(cfg.hardware.timeout_ms, 2_500);
    assert_eq!(cfg.storage.data_dir, std::path::PathBuf::from("/srv/tether"));
    assert_eq!(cfg.iam.unknown_action, UnknownActionPolicy::Deny);
}

#[test]
fn unrelated_variables_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let overrides = env(&[("OTHER__MODE", "production"), ("PATH", "/bin")]);

    let cfg: TetherConfig =
        load_config_with_env(Some(dir.path().join("none.toml")), Some(overrides)).unwrap();
    assert_eq!(cfg.mode, RuntimeMode::Development);
}
