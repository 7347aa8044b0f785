use crate::fingerprint::HardwareFingerprint;
use crate::machine::MachineAlgorithm;
use serde::{Deserialize, Serialize};

/// Full activation record. This is what gets sealed into the `encrypted` blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRecord {
    pub machine_code: String,
    pub activation_code: String,
    /// RFC 3339 timestamp of the successful activation.
    pub activated_date: String,
    #[serde(rename = "deviceLedger")]
    pub fingerprint: HardwareFingerprint,
}

/// On-disk activation file: a plaintext header plus the sealed record.
///
/// The header is informational. Trust comes only from the `encrypted` blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationFile {
    pub machine_code: String,
    pub activation_code: String,
    pub activated_date: String,
    pub encrypted: String,
}

/// Why a device is not considered activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotActivatedReason {
    /// No activation file exists.
    Missing,
    /// The stored machine code belongs to other hardware.
    MachineMismatch,
    /// The stored activation code does not verify.
    InvalidCode,
    /// The sealed record failed authentication or disagrees with the header.
    Tampered,
    /// The file could not be read or parsed.
    Corrupt,
}

impl NotActivatedReason {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Missing => "This device has not been activated",
            Self::MachineMismatch => "Activation belongs to a different machine",
            Self::InvalidCode => "Stored activation code is invalid",
            Self::Tampered => "Activation record has been modified",
            Self::Corrupt => "Activation file is unreadable",
        }
    }
}

/// Result of checking the persisted activation against the current hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActivationStatus {
    Activated { algorithm: MachineAlgorithm },
    NotActivated { reason: NotActivatedReason },
}

impl ActivationStatus {
    #[must_use]
    pub const fn is_activated(&self) -> bool {
        matches!(self, Self::Activated { .. })
    }

    #[must_use]
    pub const fn not_activated(reason: NotActivatedReason) -> Self {
        Self::NotActivated { reason }
    }
}

/// Boundary reply for an activation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationResponse {
    pub success: bool,
    pub message: String,
}
