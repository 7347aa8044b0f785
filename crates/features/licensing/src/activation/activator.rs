use crate::activation::store::ActivationStore;
use crate::error::LicenseError;
use crate::machine::{to_legacy_machine_code, to_machine_code};
use crate::protocol::{ActivationCode, verify, verify_for_fingerprint};
use std::fmt;
use tether_domain::activation::{ActivationFile, ActivationRecord, ActivationStatus, NotActivatedReason};
use tether_domain::fingerprint::HardwareFingerprint;
use tether_domain::machine::{MachineAlgorithm, MachineCode};
use tether_kernel::time::SharedClock;
use tether_vault::Vault;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

/// A successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationOutcome {
    pub algorithm: MachineAlgorithm,
    pub machine_code: MachineCode,
    pub activated_date: String,
}

/// Validates activation codes and maintains the persisted activation record.
pub struct Activator {
    store: ActivationStore,
    vault: Vault,
    mac_key: Zeroizing<Vec<u8>>,
    clock: SharedClock,
}

impl fmt::Debug for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activator")
            .field("store", &self.store)
            .field("vault", &self.vault)
            .field("mac_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl Activator {
    #[must_use]
    pub fn new(store: ActivationStore, vault: Vault, mac_key: &[u8], clock: SharedClock) -> Self {
        Self { store, vault, mac_key: Zeroizing::new(mac_key.to_vec()), clock }
    }

    #[must_use]
    pub const fn store(&self) -> &ActivationStore {
        &self.store
    }

    /// Verifies `candidate` for `fingerprint`, then seals and persists a fresh record.
    ///
    /// A previous activation is overwritten.
    ///
    /// # Errors
    /// * [`LicenseError::Format`] or [`LicenseError::Mismatch`] If the code is rejected.
    /// * [`LicenseError::Vault`] or [`LicenseError::Io`] If the record cannot be stored.
    pub async fn activate(
        &self,
        candidate: &str,
        fingerprint: &HardwareFingerprint,
    ) -> Result<ActivationOutcome, LicenseError> {
        let candidate = candidate.trim();
        let algorithm = verify_for_fingerprint(candidate, fingerprint, &self.mac_key).inspect_err(|e| {
            if e.code() == "format" {
                warn!(length = candidate.len(), "Activation code format invalid");
            } else {
                warn!(error = %e, "Activation code rejected");
            }
        })?;

        let machine_code = match algorithm {
            MachineAlgorithm::Sha256 => to_machine_code(fingerprint),
            MachineAlgorithm::LegacyMd5 => to_legacy_machine_code(fingerprint),
        };
        let activation_code = ActivationCode::parse(candidate)?;
        let activated_date = self.clock.now_rfc3339();

        let record = ActivationRecord {
            machine_code: machine_code.to_string(),
            activation_code: activation_code.to_string(),
            activated_date: activated_date.clone(),
            fingerprint: fingerprint.clone(),
        };
        let encrypted = self.vault.seal_record(&record)?;

        let file = ActivationFile {
            machine_code: record.machine_code,
            activation_code: record.activation_code,
            activated_date: activated_date.clone(),
            encrypted,
        };
        self.store.save(&file).await?;

        info!(machine = machine_code.short(), algorithm = %algorithm, "Device activated");
        Ok(ActivationOutcome { algorithm, machine_code, activated_date })
    }

    /// Checks the stored activation against the current hardware.
    ///
    /// The plaintext header is only a hint: the sealed record must open and agree with it.
    pub async fn status(&self, fingerprint: &HardwareFingerprint) -> ActivationStatus {
        let file = match self.store.load().await {
            Ok(Some(file)) => file,
            Ok(None) => return ActivationStatus::not_activated(NotActivatedReason::Missing),
            Err(e) => {
                warn!(error = %e, "Activation file unreadable");
                return ActivationStatus::not_activated(NotActivatedReason::Corrupt);
            },
        };

        let Ok(stored) = MachineCode::parse(&file.machine_code) else {
            warn!("Stored machine code is malformed");
            return ActivationStatus::not_activated(NotActivatedReason::Corrupt);
        };

        let current = match stored.algorithm() {
            MachineAlgorithm::Sha256 => to_machine_code(fingerprint),
            MachineAlgorithm::LegacyMd5 => to_legacy_machine_code(fingerprint),
        };
        if stored != current {
            info!(stored = stored.short(), current = current.short(), "Activation belongs to other hardware");
            return ActivationStatus::not_activated(NotActivatedReason::MachineMismatch);
        }

        if let Err(e) = verify(&file.activation_code, &stored, &self.mac_key) {
            warn!(error = %e, "Stored activation code does not verify");
            return ActivationStatus::not_activated(NotActivatedReason::InvalidCode);
        }

        let record: ActivationRecord = match self.vault.open_record(&file.encrypted) {
            Ok(record) => record,
            Err(e) if e.is_integrity_failure() => {
                warn!(error = %e, "Activation record failed authentication");
                return ActivationStatus::not_activated(NotActivatedReason::Tampered);
            },
            Err(e) => {
                warn!(error = %e, "Activation record unreadable");
                return ActivationStatus::not_activated(NotActivatedReason::Corrupt);
            },
        };

        if !record.machine_code.eq_ignore_ascii_case(&file.machine_code)
            || !record.activation_code.eq_ignore_ascii_case(&file.activation_code)
        {
            warn!("Activation header disagrees with the sealed record");
            return ActivationStatus::not_activated(NotActivatedReason::Tampered);
        }

        debug!(machine = stored.short(), algorithm = %stored.algorithm(), "Activation verified");
        ActivationStatus::Activated { algorithm: stored.algorithm() }
    }
}
