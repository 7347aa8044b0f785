use std::sync::Arc;
use std::time::Duration;
use tether_domain::constants::{ACTION_GET_USAGE_STATS, ACTION_UPLOAD_LOGO, DEFAULT_ADMIN_PASSWORD};
use tether_domain::permissions::{PermissionFile, PermissionRule, UnknownActionPolicy};
use tether_iam::{IamHandle, IamSettings, PermissionStore, hash_password};
use tether_kernel::time::{Clock, ManualClock};

const START_MS: i64 = 1_714_557_600_000;

struct Fixture {
    dir: tempfile::TempDir,
    clock: Arc<ManualClock>,
    iam: IamHandle,
}

fn settings(dir: &tempfile::TempDir, unknown_action: UnknownActionPolicy) -> IamSettings {
    IamSettings {
        permissions_path: dir.path().join("config/permissions.json"),
        session_ttl: Duration::from_secs(3_600),
        unknown_action,
    }
}

fn fixture() -> Fixture {
    fixture_with(UnknownActionPolicy::Allow)
}

fn fixture_with(unknown_action: UnknownActionPolicy) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let clock = Arc::new(ManualClock::new(START_MS));
    let iam = PermissionStore::spawn(settings(&dir, unknown_action), clock.clone());
    Fixture { dir, clock, iam }
}

fn read_file(f: &Fixture) -> PermissionFile {
    serde_json::from_slice(&std::fs::read(f.dir.path().join("config/permissions.json")).unwrap()).unwrap()
}

#[tokio::test]
async fn first_run_writes_defaults() {
    let f = fixture();
    let policy = f.iam.policy().await.unwrap();
    assert_eq!(policy.len(), 5);

    let file = read_file(&f);
    assert_eq!(file.admin_password_hash, hash_password(DEFAULT_ADMIN_PASSWORD));
    assert!(file.session_tokens.is_empty());
    assert_eq!(file.last_updated, "2024-05-01T10:00:00.000Z");
}

#[tokio::test]
async fn bootstrap_password_opens_a_one_hour_session() {
    let f = fixture();

    let grant = f.iam.verify_admin_password("299451").await.unwrap();
    assert_eq!(grant.token.len(), 64);
    assert_eq!(grant.expires_at, START_MS + 3_600_000);

    let decision = f.iam.check_permission(ACTION_UPLOAD_LOGO, Some(&grant.token)).await;
    assert!(decision.allowed);

    f.clock.set(grant.expires_at + 1_000);
    let decision = f.iam.check_permission(ACTION_UPLOAD_LOGO, Some(&grant.token)).await;
    assert!(!decision.allowed);
    assert!(decision.requires_auth);
    assert!(!read_file(&f).session_tokens.contains_key(&grant.token));
}

#[tokio::test]
async fn session_ends_exactly_at_expiry() {
    let f = fixture();
    let grant = f.iam.verify_admin_password("299451").await.unwrap();

    f.clock.set(grant.expires_at - 1);
    assert!(f.iam.check_permission(ACTION_UPLOAD_LOGO, Some(&grant.token)).await.allowed);
    f.clock.set(grant.expires_at);
    assert!(!f.iam.check_permission(ACTION_UPLOAD_LOGO, Some(&grant.token)).await.allowed);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let f = fixture();
    let err = f.iam.verify_admin_password("123456").await.unwrap_err();
    assert_eq!(err.code(), "invalid_password");
    assert!(read_file(&f).session_tokens.is_empty());
}

#[tokio::test]
async fn unknown_and_missing_tokens_read_the_same() {
    let f = fixture();
    let grant = f.iam.verify_admin_password("299451").await.unwrap();
    f.clock.advance(Duration::from_secs(7_200));

    let expired = f.iam.check_permission(ACTION_UPLOAD_LOGO, Some(&grant.token)).await;
    let unknown = f.iam.check_permission(ACTION_UPLOAD_LOGO, Some(&"0".repeat(64))).await;
    let absent = f.iam.check_permission(ACTION_UPLOAD_LOGO, None).await;

    assert_eq!(expired, unknown);
    assert_eq!(unknown, absent);
}

#[tokio::test]
async fn open_actions_need_no_token() {
    let f = fixture();
    let decision = f.iam.check_permission(ACTION_GET_USAGE_STATS, None).await;
    assert!(decision.allowed);
    assert!(!decision.requires_auth);
}

#[tokio::test]
async fn unknown_action_follows_policy() {
    let open = fixture();
    assert!(open.iam.check_permission("launchRocket", None).await.allowed);

    let closed = fixture_with(UnknownActionPolicy::Deny);
    let decision = closed.iam.check_permission("launchRocket", None).await;
    assert!(!decision.allowed);
    assert!(!decision.requires_auth);
}

#[tokio::test]
async fn revoke_ends_only_that_session() {
    let f = fixture();
    let a = f.iam.verify_admin_password("299451").await.unwrap();
    let b = f.iam.verify_admin_password("299451").await.unwrap();

    assert!(f.iam.revoke_session(&a.token).await);
    assert!(!f.iam.revoke_session(&a.token).await);

    assert!(!f.iam.check_permission(ACTION_UPLOAD_LOGO, Some(&a.token)).await.allowed);
    assert!(f.iam.check_permission(ACTION_UPLOAD_LOGO, Some(&b.token)).await.allowed);
}

#[tokio::test]
async fn password_change_clears_sessions() {
    let f = fixture();
    let grant = f.iam.verify_admin_password("299451").await.unwrap();

    assert_eq!(f.iam.update_admin_password("wrong", "next-secret").await.unwrap_err().code(), "invalid_password");
    assert_eq!(f.iam.update_admin_password("299451", "").await.unwrap_err().code(), "invalid_input");
    f.iam.update_admin_password("299451", "next-secret").await.unwrap();

    assert!(!f.iam.check_permission(ACTION_UPLOAD_LOGO, Some(&grant.token)).await.allowed);
    assert!(f.iam.verify_admin_password("299451").await.is_err());
    assert!(f.iam.verify_admin_password("next-secret").await.is_ok());
}

#[tokio::test]
async fn clear_all_sessions_empties_the_file() {
    let f = fixture();
    f.iam.verify_admin_password("299451").await.unwrap();
    f.iam.verify_admin_password("299451").await.unwrap();
    assert_eq!(read_file(&f).session_tokens.len(), 2);

    f.iam.clear_all_sessions().await.unwrap();
    assert!(read_file(&f).session_tokens.is_empty());
}

#[tokio::test]
async fn rules_can_be_changed() {
    let f = fixture();
    f.iam.set_permission(ACTION_GET_USAGE_STATS, PermissionRule::new(true, "View usage statistics")).await.unwrap();

    let decision = f.iam.check_permission(ACTION_GET_USAGE_STATS, None).await;
    assert!(decision.requires_auth);
    assert!(read_file(&f).permissions[ACTION_GET_USAGE_STATS].requires_auth);
    assert_eq!(f.iam.set_permission(" ", PermissionRule::new(false, "")).await.unwrap_err().code(), "invalid_input");
}

#[tokio::test]
async fn state_survives_restart() {
    let f = fixture();
    let grant = f.iam.verify_admin_password("299451").await.unwrap();

    let again = PermissionStore::spawn(settings(&f.dir, UnknownActionPolicy::Allow), f.clock.clone());
    assert!(again.check_permission(ACTION_UPLOAD_LOGO, Some(&grant.token)).await.allowed);
    assert!(f.clock.now_ms() < grant.expires_at);
}

#[tokio::test]
async fn corrupt_file_denies_and_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config/permissions.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ broken").unwrap();

    let iam = PermissionStore::spawn(settings(&dir, UnknownActionPolicy::Allow), Arc::new(ManualClock::new(START_MS)));

    assert!(!iam.check_permission(ACTION_GET_USAGE_STATS, None).await.allowed);
    assert_eq!(iam.verify_admin_password("299451").await.unwrap_err().code(), "serialization");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ broken");
}
