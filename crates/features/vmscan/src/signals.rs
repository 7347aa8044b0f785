//! Pure matchers over probe output. Each returns the indicator tags it found.

/// Hypervisor vendor names, matched case-insensitively.
const VENDORS: [&str; 6] = ["hyper-v", "virtualbox", "vmware", "qemu", "xen", "kvm"];
/// Extra names that show up in DMI strings of virtual hardware.
const DMI_VENDORS: [&str; 3] = ["innotek", "bochs", "virtual machine"];
/// Guest drivers and services reported by `sc query`.
const DRIVERS: [&str; 6] = ["VBoxGuest", "VBoxService", "vmxnet", "vmci", "vmmemctl", "hyperv"];

pub const SYSTEMINFO: &str = "systeminfo_vm_detected";
pub const BIOS: &str = "bios_vm_detected";
pub const SYSTEM_PROFILER: &str = "system_profiler_vm_detected";
pub const HARDWARE_MODEL: &str = "hardware_model_vm_detected";
pub const DMI: &str = "dmi_vm_detected";
pub const CPU_HYPERVISOR: &str = "cpu_hypervisor_flag";
pub const UNUSUAL_CPU_COUNT: &str = "unusual_cpu_count";
pub const COMMON_VM_MEMORY: &str = "common_vm_memory_size";
pub const MINIMAL_DRIVES: &str = "minimal_drives";

const GIB: f64 = 1_073_741_824.0;

#[must_use]
pub fn names_hypervisor(text: &str) -> bool {
    let text = text.to_lowercase();
    VENDORS.iter().any(|v| text.contains(v))
}

#[must_use]
pub fn dmi_names_hypervisor(text: &str) -> bool {
    let lower = text.to_lowercase();
    names_hypervisor(&lower) || DMI_VENDORS.iter().any(|v| lower.contains(v))
}

/// `{driver}_driver_detected` for each guest driver named in `sc query` output.
#[must_use]
pub fn driver_tags(sc_output: &str) -> Vec<String> {
    let lower = sc_output.to_lowercase();
    DRIVERS
        .iter()
        .map(|d| d.to_lowercase())
        .filter(|d| lower.contains(d.as_str()))
        .map(|d| format!("{d}_driver_detected"))
        .collect()
}

/// Number of `C:` to `Z:` drive letters in `wmic logicaldisk` output.
#[must_use]
pub fn drive_count(wmic_output: &str) -> usize {
    let bytes = wmic_output.as_bytes();
    bytes.windows(2).filter(|w| (b'C'..=b'Z').contains(&w[0]) && w[1] == b':').count()
}

/// True when a `flags` line of `/proc/cpuinfo` carries `hypervisor`.
#[must_use]
pub fn cpuinfo_has_hypervisor_flag(cpuinfo: &str) -> bool {
    cpuinfo.lines().any(|line| {
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim() == "flags" && value.split_whitespace().any(|flag| flag == "hypervisor")
        })
    })
}

/// Anomalies derived from host resources.
#[must_use]
pub fn resource_tags(logical_cpus: usize, total_memory_bytes: u64) -> Vec<&'static str> {
    let mut tags = Vec::new();
    if logical_cpus <= 2 {
        tags.push(UNUSUAL_CPU_COUNT);
    }
    #[allow(clippy::cast_precision_loss)]
    let gib = (total_memory_bytes as f64 / GIB).round();
    if gib <= 2.0 || (gib - 4.0).abs() < f64::EPSILON || (gib - 8.0).abs() < f64::EPSILON {
        tags.push(COMMON_VM_MEMORY);
    }
    tags
}
