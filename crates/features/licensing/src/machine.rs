//! # Machine Identifier Codec
//!
//! A machine code is a digest of the canonical fingerprint string
//! `mac-cpu-disk-motherboard`. Two generations exist:
//!
//! | Algorithm | Length | Use |
//! |-----------|--------|-----|
//! | SHA-256   | 64 hex | issued and verified |
//! | MD5       | 32 hex | verification of codes issued before the migration |
//!
//! Both are lowercase hex. Every collector run yields the same strings for the same
//! hardware, so a machine code is stable across restarts as long as the probes are.

use md5::Md5;
use sha2::{Digest, Sha256};
use tether_domain::fingerprint::HardwareFingerprint;
use tether_domain::machine::MachineCode;

/// Current machine code: SHA-256 of the canonical fingerprint.
#[must_use]
pub fn to_machine_code(fingerprint: &HardwareFingerprint) -> MachineCode {
    let digest: [u8; 32] = Sha256::digest(fingerprint.canonical().as_bytes()).into();
    MachineCode::sha256(&digest)
}

/// Legacy machine code: MD5 of the same canonical string.
#[must_use]
pub fn to_legacy_machine_code(fingerprint: &HardwareFingerprint) -> MachineCode {
    let digest: [u8; 16] = Md5::digest(fingerprint.canonical().as_bytes()).into();
    MachineCode::legacy_md5(&digest)
}

/// Both generations, current first. This is the order verification tries them in.
#[must_use]
pub fn machine_codes(fingerprint: &HardwareFingerprint) -> [MachineCode; 2] {
    [to_machine_code(fingerprint), to_legacy_machine_code(fingerprint)]
}
