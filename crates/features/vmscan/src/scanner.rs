use crate::signals::{
    self, BIOS, CPU_HYPERVISOR, DMI, HARDWARE_MODEL, MINIMAL_DRIVES, SYSTEM_PROFILER, SYSTEMINFO,
};
use crate::weights::verdict;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use sysinfo::System;
use tether_domain::vm::VmVerdict;
use tether_probe::{CommandRunner, Platform, SystemRunner};
use tracing::{debug, info};

/// Per-command deadline. A slow tool just contributes nothing.
const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Host size as seen by the operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostResources {
    pub logical_cpus: usize,
    pub total_memory_bytes: u64,
}

impl HostResources {
    /// Reads CPU count and installed memory through `sysinfo`.
    #[must_use]
    pub fn current() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        system.refresh_cpu_all();
        Self { logical_cpus: system.cpus().len(), total_memory_bytes: system.total_memory() }
    }
}

/// Collects virtualization indicators and scores them.
#[derive(Debug, Clone)]
pub struct VmScanner<R: CommandRunner = SystemRunner> {
    runner: R,
    platform: Platform,
    resources: Option<HostResources>,
    probe_timeout: Duration,
}

impl VmScanner<SystemRunner> {
    #[must_use]
    pub const fn system() -> Self {
        Self::new(SystemRunner, Platform::current())
    }
}

impl<R: CommandRunner> VmScanner<R> {
    #[must_use]
    pub const fn new(runner: R, platform: Platform) -> Self {
        Self { runner, platform, resources: None, probe_timeout: DEFAULT_PROBE_TIMEOUT }
    }

    /// Uses fixed resources instead of asking the OS.
    #[must_use]
    pub const fn with_resources(mut self, resources: HostResources) -> Self {
        self.resources = Some(resources);
        self
    }

    #[must_use]
    pub const fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Runs every probe for the platform plus the resource checks.
    ///
    /// The verdict is advisory. Probe failures only mean fewer indicators.
    pub async fn detect(&self) -> VmVerdict {
        info!(platform = self.platform.as_str(), "Starting virtual machine detection");
        let mut indicators = BTreeSet::new();

        match self.platform {
            Platform::Windows => self.windows(&mut indicators).await,
            Platform::MacOs => self.macos(&mut indicators).await,
            Platform::Linux => self.linux(&mut indicators).await,
            Platform::Other => {},
        }

        let resources = self.resources.unwrap_or_else(HostResources::current);
        indicators.extend(
            signals::resource_tags(resources.logical_cpus, resources.total_memory_bytes)
                .into_iter()
                .map(str::to_owned),
        );

        let verdict = verdict(indicators);
        info!(
            is_vm = verdict.is_virtual_machine,
            indicators = verdict.indicators.len(),
            confidence = verdict.confidence,
            "Virtual machine detection completed"
        );
        verdict
    }

    async fn windows(&self, found: &mut BTreeSet<String>) {
        if self.command("systeminfo", &[]).await.is_some_and(|out| signals::names_hypervisor(&out)) {
            found.insert(SYSTEMINFO.to_owned());
        }
        if let Some(out) = self.command("sc", &["query", "type=", "driver"]).await {
            found.extend(signals::driver_tags(&out));
        }
        if self
            .command("wmic", &["baseboard", "get", "manufacturer,product"])
            .await
            .is_some_and(|out| signals::names_hypervisor(&out))
        {
            found.insert(BIOS.to_owned());
        }
        if self
            .command("wmic", &["logicaldisk", "where", "drivetype=3", "get", "name"])
            .await
            .is_some_and(|out| signals::drive_count(&out) <= 2)
        {
            found.insert(MINIMAL_DRIVES.to_owned());
        }
    }

    async fn macos(&self, found: &mut BTreeSet<String>) {
        if self
            .command("system_profiler", &["SPHardwareDataType"])
            .await
            .is_some_and(|out| out.to_lowercase().contains("virtual"))
        {
            found.insert(SYSTEM_PROFILER.to_owned());
        }
        if self.command("sysctl", &["-n", "hw.model"]).await.is_some_and(|out| signals::names_hypervisor(&out)) {
            found.insert(HARDWARE_MODEL.to_owned());
        }
    }

    async fn linux(&self, found: &mut BTreeSet<String>) {
        for path in ["/sys/class/dmi/id/sys_vendor", "/sys/class/dmi/id/product_name"] {
            if self.file(path).await.is_some_and(|text| signals::dmi_names_hypervisor(&text)) {
                found.insert(DMI.to_owned());
                break;
            }
        }
        if self.file("/proc/cpuinfo").await.is_some_and(|text| signals::cpuinfo_has_hypervisor_flag(&text)) {
            found.insert(CPU_HYPERVISOR.to_owned());
        }
    }

    async fn command(&self, program: &str, args: &[&str]) -> Option<String> {
        match tokio::time::timeout(self.probe_timeout, self.runner.run(program, args)).await {
            Ok(Ok(out)) => Some(out),
            Ok(Err(e)) => {
                debug!(program, error = %e, "VM probe failed");
                None
            },
            Err(_) => {
                debug!(program, "VM probe timed out");
                None
            },
        }
    }

    async fn file(&self, path: &str) -> Option<String> {
        match self.runner.read_file(Path::new(path)).await {
            Ok(text) => Some(text),
            Err(e) => {
                debug!(path, error = %e, "VM probe file unreadable");
                None
            },
        }
    }
}
