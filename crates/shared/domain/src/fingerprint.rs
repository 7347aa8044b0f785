use crate::constants::{UNKNOWN_CPU, UNKNOWN_HD, UNKNOWN_MAC, UNKNOWN_MB};
use serde::{Deserialize, Serialize};

/// Raw hardware identity of the current device.
///
/// Built fresh by the collector on every call and immutable afterwards. Fields that could
/// not be resolved hold one of the `UNKNOWN_*` sentinels, never an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HardwareFingerprint {
    mac: String,
    cpu: String,
    motherboard: String,
    #[serde(rename = "hardDisk", alias = "diskSerial")]
    disk_serial: String,
}

impl HardwareFingerprint {
    /// Builds a fingerprint, substituting sentinels for blank values.
    #[must_use]
    pub fn new(
        mac: impl Into<String>,
        cpu: impl Into<String>,
        motherboard: impl Into<String>,
        disk_serial: impl Into<String>,
    ) -> Self {
        Self {
            mac: or_sentinel(mac.into(), UNKNOWN_MAC),
            cpu: or_sentinel(cpu.into(), UNKNOWN_CPU),
            motherboard: or_sentinel(motherboard.into(), UNKNOWN_MB),
            disk_serial: or_sentinel(disk_serial.into(), UNKNOWN_HD),
        }
    }

    /// A fingerprint where every probe failed.
    #[must_use]
    pub fn unresolved() -> Self {
        Self::new(UNKNOWN_MAC, UNKNOWN_CPU, UNKNOWN_MB, UNKNOWN_HD)
    }

    #[must_use]
    pub fn mac(&self) -> &str {
        &self.mac
    }

    #[must_use]
    pub fn cpu(&self) -> &str {
        &self.cpu
    }

    #[must_use]
    pub fn motherboard(&self) -> &str {
        &self.motherboard
    }

    #[must_use]
    pub fn disk_serial(&self) -> &str {
        &self.disk_serial
    }

    /// The string hashed into a machine code: `mac-cpu-disk-motherboard`.
    ///
    /// The field order is part of the persisted identity and must not change.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!("{}-{}-{}-{}", self.mac, self.cpu, self.disk_serial, self.motherboard)
    }

    /// Names of the fields that fell back to a sentinel.
    #[must_use]
    pub fn degraded_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.mac == UNKNOWN_MAC {
            fields.push("mac");
        }
        if self.cpu == UNKNOWN_CPU {
            fields.push("cpu");
        }
        if self.motherboard == UNKNOWN_MB {
            fields.push("motherboard");
        }
        if self.disk_serial == UNKNOWN_HD {
            fields.push("hardDisk");
        }
        fields
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.degraded_fields().is_empty()
    }
}

fn or_sentinel(value: String, sentinel: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        sentinel.to_owned()
    } else if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_orders_disk_before_motherboard() {
        let fp = HardwareFingerprint::new("AABBCCDDEEFF", "X", "Z", "Y");
        assert_eq!(fp.canonical(), "AABBCCDDEEFF-X-Y-Z");
    }

    #[test]
    fn blank_values_become_sentinels() {
        let fp = HardwareFingerprint::new("", "  ", "board", "\n");
        assert_eq!(fp.mac(), UNKNOWN_MAC);
        assert_eq!(fp.cpu(), UNKNOWN_CPU);
        assert_eq!(fp.motherboard(), "board");
        assert_eq!(fp.disk_serial(), UNKNOWN_HD);
        assert_eq!(fp.degraded_fields(), vec!["mac", "cpu", "hardDisk"]);
    }

    #[test]
    fn unresolved_is_fully_degraded() {
        let fp = HardwareFingerprint::unresolved();
        assert!(fp.is_degraded());
        assert_eq!(fp.canonical(), "UNKNOWN_MAC-UNKNOWN_CPU-UNKNOWN_HD-UNKNOWN_MB");
    }
}
