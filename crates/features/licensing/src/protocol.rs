//! # Activation Code Protocol
//!
//! An activation code is `HMAC-SHA256(key = MAC key bytes, message = machine code hex text)`,
//! rendered as 64 lowercase hex characters.
//!
//! ## Verification order
//! 1. **Format**: exactly 64 characters from `[0-9a-fA-F]`. Nothing is hashed for malformed input.
//! 2. **MAC**: recomputed for the machine code and compared in constant time over the decoded
//!    bytes, so upper-case input verifies as well.

use crate::error::LicenseError;
use crate::machine::machine_codes;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;
use tether_domain::constants::HEX64_LEN;
use tether_domain::fingerprint::HardwareFingerprint;
use tether_domain::machine::{MachineAlgorithm, MachineCode, is_hex};
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// A well-formed activation code, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActivationCode(String);

impl ActivationCode {
    /// Applies the format check.
    ///
    /// # Errors
    /// Returns [`LicenseError::Format`] for anything but 64 hex characters.
    pub fn parse(candidate: &str) -> Result<Self, LicenseError> {
        check_format(candidate)?;
        Ok(Self(candidate.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn to_bytes(&self) -> Result<[u8; 32], LicenseError> {
        let mut out = [0u8; 32];
        hex::decode_to_slice(&self.0, &mut out).map_err(|e| LicenseError::Format {
            message: e.to_string().into(),
            context: None,
        })?;
        Ok(out)
    }
}

impl fmt::Display for ActivationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ActivationCode {
    type Error = LicenseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ActivationCode> for String {
    fn from(code: ActivationCode) -> Self {
        code.0
    }
}

fn check_format(candidate: &str) -> Result<(), LicenseError> {
    if candidate.len() != HEX64_LEN {
        return Err(LicenseError::Format {
            message: format!("expected {HEX64_LEN} characters, got {}", candidate.len()).into(),
            context: None,
        });
    }
    if !is_hex(candidate) {
        return Err(LicenseError::Format {
            message: "activation code must contain only hex characters".into(),
            context: None,
        });
    }
    Ok(())
}

fn compute_mac(machine_code: &MachineCode, mac_key: &[u8]) -> Result<[u8; 32], LicenseError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(mac_key).map_err(|e| LicenseError::Internal {
        message: e.to_string().into(),
        context: Some("HMAC key setup".into()),
    })?;
    mac.update(machine_code.as_str().as_bytes());
    Ok(mac.finalize().into_bytes().into())
}

/// Issues the activation code for a current machine code.
///
/// # Errors
/// * [`LicenseError::LegacyIssuance`] If `machine_code` is an MD5 code.
/// * [`LicenseError::Internal`] If the HMAC cannot be keyed.
pub fn issue(machine_code: &MachineCode, mac_key: &[u8]) -> Result<ActivationCode, LicenseError> {
    if !machine_code.is_issuable() {
        return Err(LicenseError::LegacyIssuance {
            message: format!("{} codes are verify-only", machine_code.algorithm()).into(),
            context: None,
        });
    }
    Ok(ActivationCode(hex::encode(compute_mac(machine_code, mac_key)?)))
}

/// Verifies `candidate` against one machine code.
///
/// Works for both generations: legacy codes were issued over the MD5 hex text.
///
/// # Errors
/// * [`LicenseError::Format`] If `candidate` is not 64 hex characters.
/// * [`LicenseError::Mismatch`] If the MAC differs.
pub fn verify(candidate: &str, machine_code: &MachineCode, mac_key: &[u8]) -> Result<(), LicenseError> {
    let presented = ActivationCode::parse(candidate)?.to_bytes()?;
    let expected = compute_mac(machine_code, mac_key)?;

    if bool::from(expected.ct_eq(&presented)) {
        Ok(())
    } else {
        Err(LicenseError::Mismatch {
            message: "activation code does not match this machine".into(),
            context: Some(machine_code.algorithm().as_str().into()),
        })
    }
}

/// Verifies `candidate` for a fingerprint, trying the current machine code before the legacy one.
///
/// Returns the algorithm of the machine code that matched.
///
/// # Errors
/// * [`LicenseError::Format`] Without trying either code.
/// * [`LicenseError::Mismatch`] If neither generation matches.
pub fn verify_for_fingerprint(
    candidate: &str,
    fingerprint: &HardwareFingerprint,
    mac_key: &[u8],
) -> Result<MachineAlgorithm, LicenseError> {
    check_format(candidate)?;

    let mut last = None;
    for code in machine_codes(fingerprint) {
        match verify(candidate, &code, mac_key) {
            Ok(()) => return Ok(code.algorithm()),
            Err(e @ LicenseError::Mismatch { .. }) => {
                debug!(algorithm = %code.algorithm(), "Activation code did not match");
                last = Some(e);
            },
            Err(e) => return Err(e),
        }
    }
    Err(last.unwrap_or_else(|| LicenseError::Mismatch { message: "no machine code".into(), context: None }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{to_legacy_machine_code, to_machine_code};

    fn key() -> Vec<u8> {
        b"k".repeat(32)
    }

    #[test]
    fn hmac_vector_matches_reference_crate() {
        let code = MachineCode::parse(&"ab".repeat(32)).unwrap();
        let mut reference = <HmacSha256 as Mac>::new_from_slice(&key()).unwrap();
        reference.update("ab".repeat(32).as_bytes());
        let expected = hex::encode(reference.finalize().into_bytes());

        assert_eq!(issue(&code, &key()).unwrap().as_str(), expected);
    }

    #[test]
    fn format_is_checked_first() {
        let code = MachineCode::parse(&"ab".repeat(32)).unwrap();
        assert_eq!(verify("abc", &code, &key()).unwrap_err().code(), "format");
        assert_eq!(verify(&"z".repeat(64), &code, &key()).unwrap_err().code(), "format");
        assert_eq!(verify(&"0".repeat(64), &code, &key()).unwrap_err().code(), "mismatch");
    }

    #[test]
    fn upper_case_candidates_verify() {
        let code = MachineCode::parse(&"cd".repeat(32)).unwrap();
        let issued = issue(&code, &key()).unwrap();
        verify(&issued.as_str().to_ascii_uppercase(), &code, &key()).unwrap();
    }

    #[test]
    fn legacy_codes_are_verify_only() {
        let fp = HardwareFingerprint::new("AABBCCDDEEFF", "X", "Z", "Y");
        let legacy = to_legacy_machine_code(&fp);
        assert_eq!(issue(&legacy, &key()).unwrap_err().code(), "legacy_issuance");

        let mut mac = <HmacSha256 as Mac>::new_from_slice(&key()).unwrap();
        mac.update(legacy.as_str().as_bytes());
        let legacy_code = hex::encode(mac.finalize().into_bytes());

        assert_eq!(verify_for_fingerprint(&legacy_code, &fp, &key()).unwrap(), MachineAlgorithm::LegacyMd5);
    }

    #[test]
    fn fingerprint_prefers_current_code() {
        let fp = HardwareFingerprint::new("AABBCCDDEEFF", "X", "Z", "Y");
        let issued = issue(&to_machine_code(&fp), &key()).unwrap();
        assert_eq!(verify_for_fingerprint(issued.as_str(), &fp, &key()).unwrap(), MachineAlgorithm::Sha256);

        let other = HardwareFingerprint::new("001122334455", "X", "Z", "Y");
        assert_eq!(verify_for_fingerprint(issued.as_str(), &other, &key()).unwrap_err().code(), "mismatch");
    }

    #[test]
    fn activation_code_deserializes_with_format_check() {
        let ok: ActivationCode = serde_json::from_str(&format!("\"{}\"", "AB".repeat(32))).unwrap();
        assert_eq!(ok.as_str(), "ab".repeat(32));
        assert!(serde_json::from_str::<ActivationCode>("\"nope\"").is_err());
    }
}
