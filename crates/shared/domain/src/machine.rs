use crate::constants::{HEX64_LEN, LEGACY_HEX_LEN};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Digest family a [`MachineCode`] was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineAlgorithm {
    /// SHA-256, 64 hex characters. The only variant codes are issued against.
    Sha256,
    /// MD5, 32 hex characters. Kept to verify codes issued before the migration.
    LegacyMd5,
}

impl MachineAlgorithm {
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => HEX64_LEN,
            Self::LegacyMd5 => LEGACY_HEX_LEN,
        }
    }

    #[must_use]
    pub const fn is_issuable(self) -> bool {
        matches!(self, Self::Sha256)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::LegacyMd5 => "legacy_md5",
        }
    }
}

impl fmt::Display for MachineAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection reasons for [`MachineCode::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineCodeParseError {
    Length(usize),
    Charset,
}

impl fmt::Display for MachineCodeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length(len) => write!(
                f,
                "machine code must be {HEX64_LEN} or {LEGACY_HEX_LEN} hex characters, got {len}"
            ),
            Self::Charset => f.write_str("machine code must contain only hex characters"),
        }
    }
}

impl std::error::Error for MachineCodeParseError {}

/// Versioned digest of a hardware fingerprint. Always lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MachineCode {
    algorithm: MachineAlgorithm,
    digest: String,
}

impl MachineCode {
    /// Wraps an already computed digest. Case is normalized.
    ///
    /// # Errors
    /// Returns [`MachineCodeParseError`] when the digest does not fit `algorithm`.
    pub fn from_digest(
        algorithm: MachineAlgorithm,
        digest: impl Into<String>,
    ) -> Result<Self, MachineCodeParseError> {
        let digest = digest.into();
        if digest.len() != algorithm.hex_len() {
            return Err(MachineCodeParseError::Length(digest.len()));
        }
        if !is_hex(&digest) {
            return Err(MachineCodeParseError::Charset);
        }
        Ok(Self { algorithm, digest: digest.to_ascii_lowercase() })
    }

    /// Current code from a raw SHA-256 digest.
    #[must_use]
    pub fn sha256(digest: &[u8; 32]) -> Self {
        Self { algorithm: MachineAlgorithm::Sha256, digest: lower_hex(digest) }
    }

    /// Legacy code from a raw MD5 digest.
    #[must_use]
    pub fn legacy_md5(digest: &[u8; 16]) -> Self {
        Self { algorithm: MachineAlgorithm::LegacyMd5, digest: lower_hex(digest) }
    }

    /// Parses operator or file input. The length picks the algorithm.
    ///
    /// # Errors
    /// Returns [`MachineCodeParseError`] for any other length or a non-hex character.
    pub fn parse(input: &str) -> Result<Self, MachineCodeParseError> {
        let input = input.trim();
        let algorithm = match input.len() {
            HEX64_LEN => MachineAlgorithm::Sha256,
            LEGACY_HEX_LEN => MachineAlgorithm::LegacyMd5,
            other => return Err(MachineCodeParseError::Length(other)),
        };
        Self::from_digest(algorithm, input)
    }

    #[must_use]
    pub const fn algorithm(&self) -> MachineAlgorithm {
        self.algorithm
    }

    #[must_use]
    pub const fn is_issuable(&self) -> bool {
        self.algorithm.is_issuable()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.digest
    }

    /// First eight characters, for log lines.
    #[must_use]
    pub fn short(&self) -> &str {
        &self.digest[..8]
    }
}

impl fmt::Display for MachineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digest)
    }
}

impl Serialize for MachineCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.digest)
    }
}

impl<'de> Deserialize<'de> for MachineCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// True when every character is `[0-9a-fA-F]`. Empty input is not hex.
#[must_use]
pub fn is_hex(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_hexdigit())
}

fn lower_hex(bytes: &[u8]) -> String {
    use fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_picks_algorithm_by_length() {
        let current = MachineCode::parse(&"A".repeat(64)).unwrap();
        assert_eq!(current.algorithm(), MachineAlgorithm::Sha256);
        assert_eq!(current.as_str(), "a".repeat(64));
        assert!(current.is_issuable());

        let legacy = MachineCode::parse(&"0f".repeat(16)).unwrap();
        assert_eq!(legacy.algorithm(), MachineAlgorithm::LegacyMd5);
        assert!(!legacy.is_issuable());
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(MachineCode::parse("abc"), Err(MachineCodeParseError::Length(3)));
        assert_eq!(MachineCode::parse(&"g".repeat(64)), Err(MachineCodeParseError::Charset));
        assert_eq!(MachineCode::parse(""), Err(MachineCodeParseError::Length(0)));
    }

    #[test]
    fn short_is_eight_chars() {
        let code = MachineCode::parse(&"1234567890".repeat(7)[..64]).unwrap();
        assert_eq!(code.short(), "12345678");
    }

    #[test]
    fn raw_digests_encode_lowercase() {
        let code = MachineCode::sha256(&[0xAB; 32]);
        assert_eq!(code.as_str(), "ab".repeat(32));
        assert_eq!(code.algorithm(), MachineAlgorithm::Sha256);
        assert_eq!(MachineCode::legacy_md5(&[0x0F; 16]).as_str(), "0f".repeat(16));
    }

    #[test]
    fn is_hex_requires_content() {
        assert!(is_hex("deadBEEF"));
        assert!(!is_hex(""));
        assert!(!is_hex("xyz"));
    }
}
