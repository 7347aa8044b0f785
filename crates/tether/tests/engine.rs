use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tether::Engine;
use tether::domain::activation::{ActivationStatus, NotActivatedReason};
use tether::domain::config::TetherConfig;
use tether::domain::constants::{ACTION_GET_USAGE_STATS, ACTION_UPLOAD_LOGO, DEFAULT_ADMIN_PASSWORD};
use tether::domain::machine::MachineAlgorithm;
use tether::kernel::time::ManualClock;
use tether::licensing::{issue, to_machine_code};
use tether::probe::{Platform, ScriptedRunner};
use tether::secrets::SecretSet;
use tether::vmscan::HostResources;

const MAC_KEY: &str = "an-activation-mac-key-of-32-chars";
const START_MS: i64 = 1_714_557_600_000;

fn secrets() -> SecretSet {
    SecretSet::from_parts(MAC_KEY, [7; 32], [9; 16]).unwrap()
}

fn config(dir: &TempDir) -> TetherConfig {
    let mut config = TetherConfig::default();
    config.storage.data_dir = dir.path().to_path_buf();
    config
}

fn engine(config: TetherConfig) -> Engine<ScriptedRunner> {
    Engine::builder(config)
        .runner(ScriptedRunner::new(), Platform::Other)
        .mac(Some("AA:BB:CC:DD:EE:FF".to_owned()))
        .host_resources(HostResources { logical_cpus: 8, total_memory_bytes: 16 << 30 })
        .clock(Arc::new(ManualClock::new(START_MS)))
        .build(&secrets())
        .unwrap()
}

#[tokio::test]
async fn machine_code_is_stable() {
    let dir = TempDir::new().unwrap();
    let engine = engine(config(&dir));

    let first = engine.machine_code().await;
    assert_eq!(first.len(), 64);
    assert_eq!(first, engine.machine_code().await);
    assert_eq!(first, to_machine_code(&engine.fingerprint().await).as_str());
}

#[tokio::test(start_paused = true)]
async fn partial_fingerprint_is_collected_again() {
    let dir = TempDir::new().unwrap();
    let mut config = config(&dir);
    config.hardware.timeout_ms = 1_000;

    let runner = ScriptedRunner::new()
        .file("/proc/cpuinfo", "model name : Xeon\n")
        .slow_command("dmidecode -t baseboard", "\tSerial Number: MB-1\n", Duration::from_secs(30));
    let engine = Engine::builder(config)
        .runner(runner.clone(), Platform::Linux)
        .mac(Some("AA:BB:CC:DD:EE:FF".to_owned()))
        .build(&secrets())
        .unwrap();

    let baseboard_calls =
        || runner.calls().iter().filter(|call| call.as_str() == "dmidecode -t baseboard").count();

    engine.machine_code().await;
    engine.machine_code().await;
    assert_eq!(baseboard_calls(), 2);
}

#[tokio::test]
async fn degraded_but_complete_fingerprint_is_cached() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new();
    let engine = Engine::builder(config(&dir))
        .runner(runner.clone(), Platform::Linux)
        .mac(None)
        .build(&secrets())
        .unwrap();

    assert!(engine.fingerprint().await.is_degraded());
    let first_pass = runner.calls().len();
    assert!(first_pass > 0);

    engine.machine_code().await;
    assert_eq!(runner.calls().len(), first_pass);
}

#[tokio::test]
async fn activation_flow() {
    let dir = TempDir::new().unwrap();
    let engine = engine(config(&dir));

    assert_eq!(
        engine.activation_status().await,
        ActivationStatus::not_activated(NotActivatedReason::Missing)
    );

    let rejected = engine.activate(&"0".repeat(64)).await;
    assert!(!rejected.success);
    assert_eq!(rejected.message, "Invalid activation code");

    let short = engine.activate("abc").await;
    assert_eq!(short.message, rejected.message);

    let machine = to_machine_code(&engine.fingerprint().await);
    let code = issue(&machine, MAC_KEY.as_bytes()).unwrap();
    let accepted = engine.activate(code.as_str()).await;
    assert!(accepted.success, "{}", accepted.message);

    assert_eq!(
        engine.activation_status().await,
        ActivationStatus::Activated { algorithm: MachineAlgorithm::Sha256 }
    );
    assert!(dir.path().join("activation.json").exists());
}

#[tokio::test]
async fn admin_session_flow() {
    let dir = TempDir::new().unwrap();
    let engine = engine(config(&dir));

    let denied = engine.check_permission(ACTION_UPLOAD_LOGO, None).await;
    assert!(!denied.allowed);
    assert!(denied.requires_auth);
    assert!(engine.check_permission(ACTION_GET_USAGE_STATS, None).await.allowed);

    let wrong = engine.verify_admin_password("nope").await;
    assert!(!wrong.success);
    assert!(wrong.token.is_none());
    assert_eq!(wrong.message, "Incorrect password, please try again");

    let login = engine.verify_admin_password(DEFAULT_ADMIN_PASSWORD).await;
    assert!(login.success);
    assert_eq!(login.expires_at, Some(START_MS + 3_600_000));
    let token = login.token.unwrap();
    assert!(engine.check_permission(ACTION_UPLOAD_LOGO, Some(&token)).await.allowed);

    let bad_change = engine.update_admin_password("nope", "fresh-password").await;
    assert!(!bad_change.success);
    assert_eq!(bad_change.message, "Old password is incorrect");

    let change = engine.update_admin_password(DEFAULT_ADMIN_PASSWORD, "fresh-password").await;
    assert!(change.success);
    assert!(!engine.check_permission(ACTION_UPLOAD_LOGO, Some(&token)).await.allowed);
    assert!(!engine.revoke_session(&token).await);

    let relogin = engine.verify_admin_password("fresh-password").await;
    let token = relogin.token.unwrap();
    assert!(engine.revoke_session(&token).await);
}

#[tokio::test]
async fn vm_scan_follows_config() {
    let dir = TempDir::new().unwrap();
    let verdict = engine(config(&dir)).detect_vm().await.unwrap();
    assert!(!verdict.is_virtual_machine);

    let mut disabled = config(&dir);
    disabled.vm.enabled = false;
    assert!(engine(disabled).detect_vm().await.is_none());
}
