//! # Vault Errors
//!
//! This module defines the [`VaultError`] enum used throughout the vault crate for
//! reporting cryptographic, encoding, and configuration failures.

use std::borrow::Cow;

/// A specialized [`VaultError`] enum for vault-related failures.
#[tether_derive::tether_error]
pub enum VaultError {
    /// Failure during the encryption process (RNG or AEAD).
    #[error("Encryption error{}: {message}", format_context(.context))]
    Encryption { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The authentication tag did not verify.
    ///
    /// Wrong key, a flipped bit anywhere in IV, tag or ciphertext, or a forged blob.
    #[error("Record tampered{}: {message}", format_context(.context))]
    Tampered { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The blob is not valid base64.
    #[error("Encoding error{}: {source}", format_context(.context))]
    Encoding { source: base64::DecodeError, context: Option<Cow<'static, str>> },

    /// JSON failure, either before sealing or after a successful authentication.
    #[error("Serialization error{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Failure when the vault or builder is incorrectly configured.
    #[error("Invalid configuration{}: {message}", format_context(.context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Failure when the decoded payload is too short to hold an IV and a tag.
    #[error("Invalid payload{}: {message}", format_context(.context))]
    InvalidPayload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal vault error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl VaultError {
    /// True for failures that mean the stored data cannot be trusted.
    #[must_use]
    pub const fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::Tampered { .. } | Self::InvalidPayload { .. } | Self::Encoding { .. })
    }
}
