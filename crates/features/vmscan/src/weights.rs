use std::collections::BTreeSet;
use tether_domain::vm::VmVerdict;

/// Score of one indicator. Anything not listed counts for 5.
#[must_use]
pub fn weight(indicator: &str) -> u32 {
    match indicator {
        "systeminfo_vm_detected" | "cpu_hypervisor_flag" => 30,
        "bios_vm_detected" | "dmi_vm_detected" => 40,
        "system_profiler_vm_detected" | "hardware_model_vm_detected" => 35,
        "vboxguest_driver_detected" | "vmxnet_driver_detected" => 50,
        "vmci_driver_detected" => 45,
        "common_vm_memory_size" => 15,
        "unusual_cpu_count" | "minimal_drives" => 10,
        _ => 5,
    }
}

/// Sum of weights, capped at 100.
#[must_use]
pub fn confidence(indicators: &BTreeSet<String>) -> u8 {
    let total: u32 = indicators.iter().map(|i| weight(i)).sum();
    u8::try_from(total.min(100)).unwrap_or(100)
}

/// Any indicator at all marks the host as virtual.
#[must_use]
pub fn verdict(indicators: BTreeSet<String>) -> VmVerdict {
    VmVerdict {
        is_virtual_machine: !indicators.is_empty(),
        confidence: confidence(&indicators),
        indicators,
    }
}
