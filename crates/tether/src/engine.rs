use crate::error::{EngineError, EngineErrorExt};
use std::sync::Arc;
use std::time::Duration;
use tether_domain::activation::{ActivationResponse, ActivationStatus};
use tether_domain::config::TetherConfig;
use tether_domain::fingerprint::HardwareFingerprint;
use tether_domain::permissions::{AuthResponse, PermissionDecision, UpdateResponse};
use tether_domain::vm::VmVerdict;
use tether_iam::{IamError, IamHandle, IamSettings, PermissionStore};
use tether_kernel::redact;
use tether_kernel::time::{SharedClock, SystemClock};
use tether_licensing::{ActivationStore, Activator, to_machine_code};
use tether_probe::{Collection, CommandRunner, FingerprintCollector, Platform, SystemRunner};
use tether_secrets::SecretSet;
use tether_vault::Vault;
use tether_vmscan::{HostResources, VmScanner};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Assembles an [`Engine`]. Obtained from [`Engine::builder`].
#[derive(Debug)]
pub struct EngineBuilder<R: CommandRunner = SystemRunner> {
    config: TetherConfig,
    runner: R,
    platform: Platform,
    clock: SharedClock,
    mac: Option<Option<String>>,
    resources: Option<HostResources>,
}

impl<R: CommandRunner + Clone> EngineBuilder<R> {
    /// Probes through `runner` as if running on `platform`.
    #[must_use]
    pub fn runner<T: CommandRunner + Clone>(self, runner: T, platform: Platform) -> EngineBuilder<T> {
        EngineBuilder {
            config: self.config,
            runner,
            platform,
            clock: self.clock,
            mac: self.mac,
            resources: self.resources,
        }
    }

    #[must_use]
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Fixes the adapter address instead of enumerating interfaces.
    #[must_use]
    pub fn mac(mut self, mac: Option<String>) -> Self {
        self.mac = Some(mac);
        self
    }

    /// Fixes the host size seen by the VM scan.
    #[must_use]
    pub const fn host_resources(mut self, resources: HostResources) -> Self {
        self.resources = Some(resources);
        self
    }

    /// Builds the engine and spawns the permission store task.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// Returns [`EngineError`] if the secret set is invalid or the record key is rejected.
    pub fn build(self, secrets: &SecretSet) -> Result<Engine<R>, EngineError> {
        secrets.validate().context("engine secrets")?;

        let vault = Vault::builder().key(secrets.enc_key())?.build().context("record codec")?;

        let mut collector = FingerprintCollector::new(
            self.runner.clone(),
            self.platform,
            Duration::from_millis(self.config.hardware.timeout_ms),
        );
        if let Some(mac) = self.mac {
            collector = collector.with_mac(mac);
        }

        let mut scanner = VmScanner::new(self.runner, self.platform);
        if let Some(resources) = self.resources {
            scanner = scanner.with_resources(resources);
        }

        let activator = Activator::new(
            ActivationStore::new(self.config.storage.activation_path()),
            vault,
            secrets.mac_key(),
            Arc::clone(&self.clock),
        );
        let iam = PermissionStore::spawn(IamSettings::from(&self.config), self.clock);

        info!(
            mode = %self.config.mode,
            platform = self.platform.as_str(),
            data_dir = %self.config.storage.data_dir.display(),
            "Engine ready"
        );

        Ok(Engine {
            config: self.config,
            collector,
            scanner,
            activator,
            iam,
            fingerprint: Mutex::new(None),
        })
    }
}

/// Explicit context owning every core component.
///
/// Built once in `main` and passed by reference. The hardware fingerprint is collected on
/// first use and reused for the lifetime of the engine, unless probing hit its deadline.
#[derive(Debug)]
pub struct Engine<R: CommandRunner = SystemRunner> {
    config: TetherConfig,
    collector: FingerprintCollector<R>,
    scanner: VmScanner<R>,
    activator: Activator,
    iam: IamHandle,
    fingerprint: Mutex<Option<HardwareFingerprint>>,
}

impl Engine<SystemRunner> {
    /// Builder probing the real host.
    #[must_use]
    pub fn builder(config: TetherConfig) -> EngineBuilder<SystemRunner> {
        EngineBuilder {
            config,
            runner: SystemRunner,
            platform: Platform::current(),
            clock: Arc::new(SystemClock),
            mac: None,
            resources: None,
        }
    }

    /// Engine for the current host with the system clock.
    ///
    /// # Errors
    /// See [`EngineBuilder::build`].
    pub fn new(config: TetherConfig, secrets: &SecretSet) -> Result<Self, EngineError> {
        Self::builder(config).build(secrets)
    }
}

impl<R: CommandRunner> Engine<R> {
    #[must_use]
    pub const fn config(&self) -> &TetherConfig {
        &self.config
    }

    /// Direct access to the permission store for administrative tooling.
    #[must_use]
    pub const fn iam(&self) -> &IamHandle {
        &self.iam
    }

    /// Hardware fingerprint of this device.
    ///
    /// A partial result from a timed-out collection is returned but not kept, so the next
    /// call probes again.
    pub async fn fingerprint(&self) -> HardwareFingerprint {
        let mut cached = self.fingerprint.lock().await;
        if let Some(fingerprint) = cached.as_ref() {
            return fingerprint.clone();
        }

        let Collection { fingerprint, timed_out } = self.collector.collect_detailed().await;
        if timed_out {
            warn!(degraded = ?fingerprint.degraded_fields(), "Partial fingerprint will not be cached");
        } else {
            *cached = Some(fingerprint.clone());
        }
        fingerprint
    }

    /// Current machine code as 64 lowercase hex characters.
    pub async fn machine_code(&self) -> String {
        to_machine_code(&self.fingerprint().await).to_string()
    }

    /// Validates `code` against this device and persists the activation.
    pub async fn activate(&self, code: &str) -> ActivationResponse {
        let fingerprint = self.fingerprint().await;
        match self.activator.activate(code, &fingerprint).await {
            Ok(outcome) => {
                info!(algorithm = %outcome.algorithm, "Activation successful");
                ActivationResponse { success: true, message: "Activation successful".to_owned() }
            },
            Err(e) => {
                if !e.is_rejection() {
                    warn!(error = %e, "Activation could not be completed");
                }
                ActivationResponse { success: false, message: e.user_message().to_owned() }
            },
        }
    }

    /// Whether the stored activation is valid for this device.
    pub async fn activation_status(&self) -> ActivationStatus {
        let status = self.activator.status(&self.fingerprint().await).await;
        info!(activated = status.is_activated(), "Activation check completed");
        status
    }

    pub async fn verify_admin_password(&self, password: &str) -> AuthResponse {
        match self.iam.verify_admin_password(password).await {
            Ok(grant) => AuthResponse {
                success: true,
                token: Some(grant.token),
                expires_at: Some(grant.expires_at),
                message: "Password verified".to_owned(),
            },
            Err(IamError::InvalidPassword { .. }) => AuthResponse {
                success: false,
                token: None,
                expires_at: None,
                message: "Incorrect password, please try again".to_owned(),
            },
            Err(e) => AuthResponse {
                success: false,
                token: None,
                expires_at: None,
                message: format!("Password verification failed: {e}"),
            },
        }
    }

    pub async fn check_permission(&self, action: &str, token: Option<&str>) -> PermissionDecision {
        self.iam.check_permission(action, token).await
    }

    /// Ends one session. False when the token was unknown.
    pub async fn revoke_session(&self, token: &str) -> bool {
        let revoked = self.iam.revoke_session(token).await;
        if !revoked {
            info!(token = redact(token), "Logout for unknown session");
        }
        revoked
    }

    /// Changes the admin password. Every open session ends on success.
    pub async fn update_admin_password(&self, old: &str, new: &str) -> UpdateResponse {
        match self.iam.update_admin_password(old, new).await {
            Ok(()) => UpdateResponse {
                success: true,
                message: "Password updated, please log in again".to_owned(),
            },
            Err(IamError::InvalidPassword { .. }) => {
                UpdateResponse { success: false, message: "Old password is incorrect".to_owned() }
            },
            Err(e) => UpdateResponse { success: false, message: format!("Password update failed: {e}") },
        }
    }

    /// Advisory VM scan. `None` when disabled by `vm.enabled`.
    pub async fn detect_vm(&self) -> Option<VmVerdict> {
        if !self.config.vm.enabled {
            return None;
        }
        Some(self.scanner.detect().await)
    }
}
