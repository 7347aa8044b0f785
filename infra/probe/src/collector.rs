use crate::mac::primary_mac;
use crate::platform::Platform;
use crate::probes::{Component, probe};
use crate::runner::{CommandRunner, SystemRunner};
use std::time::Duration;
use tether_domain::fingerprint::HardwareFingerprint;
use tracing::{debug, warn};

/// Result of one collection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub fingerprint: HardwareFingerprint,
    /// The deadline cut probing short, so a later pass may resolve more fields.
    pub timed_out: bool,
}

/// Builds a [`HardwareFingerprint`] for the current device.
#[derive(Debug, Clone)]
pub struct FingerprintCollector<R: CommandRunner = SystemRunner> {
    runner: R,
    platform: Platform,
    timeout: Duration,
    mac_override: Option<Option<String>>,
}

impl FingerprintCollector<SystemRunner> {
    /// Collector that probes the real host.
    #[must_use]
    pub const fn system(timeout: Duration) -> Self {
        Self::new(SystemRunner, Platform::current(), timeout)
    }
}

impl<R: CommandRunner> FingerprintCollector<R> {
    #[must_use]
    pub const fn new(runner: R, platform: Platform, timeout: Duration) -> Self {
        Self { runner, platform, timeout, mac_override: None }
    }

    /// Replaces adapter enumeration with a fixed answer. `None` simulates a host with no
    /// usable adapter.
    #[must_use]
    pub fn with_mac(mut self, mac: Option<String>) -> Self {
        self.mac_override = Some(mac);
        self
    }

    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Collects a fresh fingerprint. Never fails: unresolved fields carry sentinels.
    pub async fn collect(&self) -> HardwareFingerprint {
        self.collect_detailed().await.fingerprint
    }

    /// Like [`FingerprintCollector::collect`], but also reports whether the deadline hit.
    ///
    /// The CPU, baseboard and disk chains run sequentially under one deadline. Values that
    /// resolved before the deadline are kept.
    pub async fn collect_detailed(&self) -> Collection {
        let mac = match &self.mac_override {
            Some(mac) => mac.clone(),
            None => primary_mac(),
        };
        if mac.is_none() {
            debug!("No usable network adapter address");
        }

        let mut cpu = None;
        let mut motherboard = None;
        let mut disk = None;

        let chains = async {
            cpu = self.resolve(Component::Cpu).await;
            motherboard = self.resolve(Component::Motherboard).await;
            disk = self.resolve(Component::Disk).await;
        };

        let timed_out = tokio::time::timeout(self.timeout, chains).await.is_err();
        if timed_out {
            warn!(
                timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                "Hardware probing timed out, using partial results"
            );
        }

        let fingerprint = HardwareFingerprint::new(
            mac.unwrap_or_default(),
            cpu.unwrap_or_default(),
            motherboard.unwrap_or_default(),
            disk.unwrap_or_default(),
        );
        if fingerprint.is_degraded() {
            debug!(
                platform = self.platform.as_str(),
                degraded = ?fingerprint.degraded_fields(),
                "Fingerprint collected with sentinel fields"
            );
        }
        Collection { fingerprint, timed_out }
    }

    async fn resolve(&self, component: Component) -> Option<String> {
        match probe(&self.runner, self.platform, component).await {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(component = component.as_str(), error = %e, "Probe chain exhausted");
                None
            },
        }
    }
}
