use crate::error::SecretsError;
use crate::kinds::{SecretKind, SecretSource};
use getrandom::fill;
use std::fmt;
use tracing::warn;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

pub const RECORD_KEY_LEN: usize = 32;
pub const IV_SEED_LEN: usize = 16;
/// Shorter MAC keys are accepted with a warning.
pub const MIN_MAC_KEY_LEN: usize = 32;

/// Resolved secrets, owned by whoever called the provisioner.
///
/// Zeroized on drop. `Debug` prints sources only.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretSet {
    mac_key: String,
    enc_key: [u8; RECORD_KEY_LEN],
    iv_seed: [u8; IV_SEED_LEN],
    #[zeroize(skip)]
    sources: [SecretSource; 3],
}

impl SecretSet {
    pub(crate) fn new(
        mac_key: String,
        enc_key: [u8; RECORD_KEY_LEN],
        iv_seed: [u8; IV_SEED_LEN],
        sources: [SecretSource; 3],
    ) -> Self {
        Self { mac_key, enc_key, iv_seed, sources }
    }

    /// Builds a set from values handed over directly.
    ///
    /// # Errors
    /// Returns [`SecretsError::Missing`] for an empty MAC key.
    pub fn from_parts(
        mac_key: impl Into<String>,
        enc_key: [u8; RECORD_KEY_LEN],
        iv_seed: [u8; IV_SEED_LEN],
    ) -> Result<Self, SecretsError> {
        let set = Self::new(mac_key.into(), enc_key, iv_seed, [SecretSource::Supplied; 3]);
        set.validate()?;
        Ok(set)
    }

    /// Key bytes for the activation MAC (the UTF-8 bytes of the configured string).
    #[must_use]
    pub fn mac_key(&self) -> &[u8] {
        self.mac_key.as_bytes()
    }

    #[must_use]
    pub const fn enc_key(&self) -> &[u8; RECORD_KEY_LEN] {
        &self.enc_key
    }

    /// Validated and exposed for tooling. Record IVs are always drawn fresh.
    #[must_use]
    pub const fn iv_seed(&self) -> &[u8; IV_SEED_LEN] {
        &self.iv_seed
    }

    #[must_use]
    pub const fn source(&self, kind: SecretKind) -> SecretSource {
        match kind {
            SecretKind::MacKey => self.sources[0],
            SecretKind::EncryptionKey => self.sources[1],
            SecretKind::IvSeed => self.sources[2],
        }
    }

    /// Checks invariants the fixed-size fields cannot express.
    ///
    /// # Errors
    /// Returns [`SecretsError::Missing`] for an empty MAC key.
    pub fn validate(&self) -> Result<(), SecretsError> {
        if self.mac_key.is_empty() {
            return Err(SecretsError::Missing {
                message: "Activation MAC key is empty".into(),
                context: Some(SecretKind::MacKey.env_var().into()),
            });
        }
        if self.mac_key.chars().count() < MIN_MAC_KEY_LEN {
            warn!(
                length = self.mac_key.chars().count(),
                minimum = MIN_MAC_KEY_LEN,
                "Activation MAC key is shorter than recommended"
            );
        }
        Ok(())
    }
}

impl fmt::Debug for SecretSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretSet")
            .field("mac_key", &"<redacted>")
            .field("enc_key", &"<redacted>")
            .field("iv_seed", &"<redacted>")
            .field("sources", &self.sources)
            .finish()
    }
}

/// Decodes the record key: 64 hex characters, or exactly 32 raw bytes.
///
/// # Errors
/// [`SecretsError::InvalidEncoding`] for a 64-character value that is not hex,
/// [`SecretsError::InvalidLength`] for any other length.
pub fn decode_record_key(value: &str) -> Result<[u8; RECORD_KEY_LEN], SecretsError> {
    decode_fixed::<RECORD_KEY_LEN>(value, SecretKind::EncryptionKey)
}

/// Decodes the IV seed: 32 hex characters, or exactly 16 raw bytes.
///
/// # Errors
/// See [`decode_record_key`].
pub fn decode_iv_seed(value: &str) -> Result<[u8; IV_SEED_LEN], SecretsError> {
    decode_fixed::<IV_SEED_LEN>(value, SecretKind::IvSeed)
}

fn decode_fixed<const N: usize>(value: &str, kind: SecretKind) -> Result<[u8; N], SecretsError> {
    let mut out = [0u8; N];
    if value.len() == N * 2 {
        hex::decode_to_slice(value, &mut out).map_err(|e| SecretsError::InvalidEncoding {
            message: format!("expected {} hex characters: {e}", N * 2).into(),
            context: Some(kind.env_var().into()),
        })?;
        return Ok(out);
    }
    if value.len() == N {
        out.copy_from_slice(value.as_bytes());
        return Ok(out);
    }
    Err(SecretsError::InvalidLength {
        message: format!(
            "expected {} hex characters or {N} raw bytes, got {}",
            N * 2,
            value.len()
        )
        .into(),
        context: Some(kind.env_var().into()),
    })
}

/// Freshly generated key material, hex-encoded for provisioning.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct GeneratedKeys {
    pub encryption_key: String,
    pub encryption_iv: String,
}

impl fmt::Debug for GeneratedKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GeneratedKeys { .. }")
    }
}

/// Draws a random 32-byte record key and 16-byte IV seed from the OS RNG.
///
/// # Errors
/// Returns [`SecretsError::Internal`] if the RNG is unavailable.
pub fn generate_keys() -> Result<GeneratedKeys, SecretsError> {
    let mut key = Zeroizing::new([0u8; RECORD_KEY_LEN]);
    let mut iv = Zeroizing::new([0u8; IV_SEED_LEN]);
    fill(&mut key[..]).map_err(|e| format!("System RNG unavailable: {e}"))?;
    fill(&mut iv[..]).map_err(|e| format!("System RNG unavailable: {e}"))?;
    Ok(GeneratedKeys { encryption_key: hex::encode(*key), encryption_iv: hex::encode(*iv) })
}
