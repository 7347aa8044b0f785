//! Authenticated encryption for the persisted activation record.
//!
//! ## Blob Format
//!
//! Every sealed value is a single base64 string (standard alphabet, padded) over:
//!
//! ```text
//! [IV(16)][TAG(16)][CIPHERTEXT(N)]
//! ```
//!
//! The cipher is AES-256-GCM with a 128-bit IV and no associated data. A fresh IV is drawn
//! from the OS RNG for every call, so sealing the same value twice yields different blobs.
//! This layout is shared with already deployed activation files and must not change.
//!
//! ## Failure Semantics
//!
//! Authentication failure is always [`VaultError::Tampered`]. The codec never returns
//! partially decrypted data and never falls back to trusting plaintext.
//!
//! ## Example
//! ```rust
//! use tether_vault::{Vault, VaultError};
//!
//! # fn main() -> Result<(), VaultError> {
//! let vault = Vault::builder().key([7u8; 32])?.build()?;
//!
//! let blob = vault.seal_record(&serde_json::json!({ "a": 1 }))?;
//! let value: serde_json::Value = vault.open_record(&blob)?;
//! assert_eq!(value["a"], 1);
//! # Ok(())
//! # }
//! ```

mod builder;
mod engine;
mod error;
mod layout;

pub use builder::VaultBuilder;
pub use engine::Vault;
pub use error::{VaultError, VaultErrorExt};
pub use layout::{IV_LEN, KEY_LEN, MIN_BLOB_LEN, TAG_LEN};
