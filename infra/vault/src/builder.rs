use crate::engine::{Vault, VaultInner};
use crate::error::VaultError;
use crate::layout::{KEY_LEN, RecordCipher};
use aead::KeyInit;
use private::Sealed;
use std::sync::Arc;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Debug, Default, ZeroizeOnDrop)]
pub struct NoKey;
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct WithKey([u8; KEY_LEN]);

impl std::fmt::Debug for WithKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WithKey(<redacted>)")
    }
}

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoKey {}
impl Sealed for WithKey {}

/// A builder for secure initialization of the [`Vault`].
///
/// Implements `ZeroizeOnDrop` to ensure that raw key material is cleared from
/// memory as soon as the builder is no longer needed.
#[allow(private_bounds)]
#[derive(Debug, Zeroize, ZeroizeOnDrop)]
pub struct VaultBuilder<K: Sealed + ZeroizeOnDrop = NoKey> {
    key: K,
}

impl Default for VaultBuilder {
    fn default() -> Self {
        Self { key: NoKey }
    }
}

impl VaultBuilder {
    #[must_use = "Builder must be configured with `key` before use"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the 256-bit record key.
    ///
    /// # Errors
    /// Returns [`VaultError::InvalidConfiguration`] unless the key is exactly 32 bytes.
    pub fn key(self, key: impl AsRef<[u8]>) -> Result<VaultBuilder<WithKey>, VaultError> {
        let key = key.as_ref();
        let bytes: [u8; KEY_LEN] =
            key.try_into().map_err(|_| VaultError::InvalidConfiguration {
                message: format!("Invalid key length {}, must be {KEY_LEN} bytes", key.len())
                    .into(),
                context: None,
            })?;
        Ok(VaultBuilder { key: WithKey(bytes) })
    }
}

impl VaultBuilder<WithKey> {
    /// Finalizes vault construction and `zeroes` the builder.
    ///
    /// # Errors
    /// Returns [`VaultError::InvalidConfiguration`] if the cipher rejects the key.
    pub fn build(mut self) -> Result<Vault, VaultError> {
        let cipher = RecordCipher::new_from_slice(&self.key.0).map_err(|_| {
            VaultError::InvalidConfiguration {
                message: "AES-256-GCM rejected the key".into(),
                context: None,
            }
        })?;

        self.zeroize();

        Ok(Vault { inner: Arc::new(VaultInner { cipher }) })
    }
}
