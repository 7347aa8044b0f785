use crate::builder::VaultBuilder;
use crate::error::{VaultError, VaultErrorExt};
use crate::layout::{IV_LEN, MIN_BLOB_LEN, RecordCipher, TAG_LEN};
use aead::AeadInPlace;
use aead::generic_array::GenericArray;
use aes_gcm::Tag;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use getrandom::fill;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

pub(crate) struct VaultInner {
    pub(crate) cipher: RecordCipher,
}

impl fmt::Debug for VaultInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultInner").field("cipher", &"AES-256-GCM/128").finish_non_exhaustive()
    }
}

/// A thread-safe container for the record cipher.
///
/// `Vault` wraps its state in an [`Arc`], making it cheaply clonable and safe to share
/// across tasks. Construct it with [`Vault::builder`].
#[derive(Debug, Clone)]
pub struct Vault {
    pub(crate) inner: Arc<VaultInner>,
}

impl Vault {
    /// Returns a new [`VaultBuilder`] to configure the vault.
    #[must_use]
    pub fn builder() -> VaultBuilder {
        VaultBuilder::new()
    }

    fn next_iv() -> Result<[u8; IV_LEN], VaultError> {
        let mut iv = [0u8; IV_LEN];
        fill(&mut iv).map_err(|e| VaultError::Encryption {
            message: format!("System RNG unavailable: {e}").into(),
            context: Some("IV generation".into()),
        })?;
        Ok(iv)
    }

    /// Serializes `value` to JSON and seals it into a base64 blob.
    ///
    /// # Errors
    /// * [`VaultError::Serialization`] If the value cannot be encoded as JSON.
    /// * [`VaultError::Encryption`] If the RNG or the AEAD fails.
    pub fn seal_record<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, VaultError> {
        let json = Zeroizing::new(serde_json::to_vec(value).context("Record encoding failed")?);
        let blob = self.seal_bytes(json.as_slice())?;
        Ok(STANDARD.encode(blob))
    }

    /// Opens a base64 blob produced by [`Vault::seal_record`] and decodes the JSON inside.
    ///
    /// # Errors
    /// * [`VaultError::Encoding`] If the blob is not base64.
    /// * [`VaultError::InvalidPayload`] If the decoded blob is shorter than IV plus tag.
    /// * [`VaultError::Tampered`] If authentication fails.
    /// * [`VaultError::Serialization`] If the authenticated plaintext is not the expected JSON.
    pub fn open_record<T: DeserializeOwned>(&self, blob: &str) -> Result<T, VaultError> {
        let raw = STANDARD.decode(blob.trim()).context("Record is not base64")?;
        let plaintext = Zeroizing::new(self.open_bytes(&raw)?);
        serde_json::from_slice(&plaintext).context("Record decoding failed")
    }

    /// Returns true when `blob` decodes and authenticates. The plaintext is discarded.
    #[must_use]
    pub fn verify_integrity(&self, blob: &str) -> bool {
        STANDARD
            .decode(blob.trim())
            .ok()
            .and_then(|raw| self.open_bytes(&raw).ok().map(Zeroizing::new))
            .is_some()
    }

    /// Encrypts raw bytes into `iv ‖ tag ‖ ciphertext`.
    ///
    /// # Errors
    /// * [`VaultError::Encryption`] If the RNG or the AEAD fails.
    pub fn seal_bytes(&self, data: impl AsRef<[u8]>) -> Result<Vec<u8>, VaultError> {
        let data = data.as_ref();
        let iv = Self::next_iv()?;

        let mut buf = Vec::with_capacity(MIN_BLOB_LEN + data.len());
        buf.extend_from_slice(&iv);
        buf.extend_from_slice(&[0u8; TAG_LEN]);
        buf.extend_from_slice(data);

        let (head, body) = buf.split_at_mut(MIN_BLOB_LEN);
        let tag = self
            .inner
            .cipher
            .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", body)
            .map_err(|_| VaultError::Encryption {
                message: "Encryption failed".into(),
                context: Some("AEAD encryption failed".into()),
            })?;
        head[IV_LEN..].copy_from_slice(tag.as_slice());

        Ok(buf)
    }

    /// Decrypts `iv ‖ tag ‖ ciphertext` back into plaintext.
    ///
    /// # Errors
    /// * [`VaultError::InvalidPayload`] If the blob is shorter than IV plus tag.
    /// * [`VaultError::Tampered`] If authentication fails.
    pub fn open_bytes(&self, blob: &[u8]) -> Result<Vec<u8>, VaultError> {
        if blob.len() < MIN_BLOB_LEN {
            return Err(VaultError::InvalidPayload {
                message: format!(
                    "Payload too short ({} bytes). Expected at least {MIN_BLOB_LEN} bytes",
                    blob.len()
                )
                .into(),
                context: None,
            });
        }

        let (iv, rest) = blob.split_at(IV_LEN);
        let (tag, ciphertext) = rest.split_at(TAG_LEN);

        let mut buf = ciphertext.to_vec();
        self.inner
            .cipher
            .decrypt_in_place_detached(
                GenericArray::from_slice(iv),
                b"",
                &mut buf,
                Tag::from_slice(tag),
            )
            .map_err(|_| VaultError::Tampered {
                message: "Authentication tag mismatch".into(),
                context: None,
            })?;

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault() -> Vault {
        Vault::builder().key([0x11; 32]).unwrap().build().unwrap()
    }

    #[test]
    fn test_iv_sequence() {
        let a = Vault::next_iv().unwrap();
        let b = Vault::next_iv().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_layout_is_iv_tag_ciphertext() {
        let sealed = vault().seal_bytes(b"hello").unwrap();
        assert_eq!(sealed.len(), IV_LEN + TAG_LEN + 5);
        assert_ne!(&sealed[MIN_BLOB_LEN..], b"hello");
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let v = vault();
        let sealed = v.seal_bytes(Vec::<u8>::new()).unwrap();
        assert_eq!(sealed.len(), MIN_BLOB_LEN);
        assert!(v.open_bytes(&sealed).unwrap().is_empty());
    }

    #[test]
    fn test_short_blob_is_invalid_payload() {
        let err = vault().open_bytes(&[0u8; MIN_BLOB_LEN - 1]).unwrap_err();
        assert!(matches!(err, VaultError::InvalidPayload { .. }));
    }

    #[test]
    fn test_wrong_key_is_tampered() {
        let sealed = vault().seal_bytes(b"data").unwrap();
        let other = Vault::builder().key([0x22; 32]).unwrap().build().unwrap();
        assert!(matches!(other.open_bytes(&sealed), Err(VaultError::Tampered { .. })));
    }
}
