//! # Licensing
//!
//! Node-locking for a single installation. A device is identified by its machine code, the
//! vendor issues an activation code for that machine code, and the device keeps a sealed
//! activation record proving it was activated.
//!
//! ## Architecture
//!
//! 1.  **Machine codes ([`machine`]):** Digests of the hardware fingerprint, current (SHA-256)
//!     and legacy (MD5).
//! 2.  **Protocol ([`protocol`]):** HMAC-SHA256 issuance and constant-time verification.
//! 3.  **Activation ([`activation`]):** Verifies a submitted code, seals the record with the
//!     vault and stores it. On start-up it re-checks everything against the current hardware.
//! 4.  **Issuance ([`issuance`]):** Batch issuance and CSV helpers for the vendor tool. Gated
//!     behind the `issuance` feature.
//!
//! Licensing is symmetric: whoever holds the MAC key can issue codes.

pub mod activation;
mod error;
#[cfg(feature = "issuance")]
pub mod issuance;
pub mod machine;
pub mod protocol;

pub use crate::error::{LicenseError, LicenseErrorExt};
pub use activation::{ActivationOutcome, ActivationStore, Activator};
pub use machine::{machine_codes, to_legacy_machine_code, to_machine_code};
pub use protocol::{ActivationCode, issue, verify, verify_for_fingerprint};
