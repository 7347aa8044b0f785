use crate::error::IamError;
use getrandom::fill;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Session tokens carry 256 bits of entropy.
const TOKEN_BYTES: usize = 32;

/// SHA-256 of the password, lowercase hex. This is the stored form.
#[must_use]
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Constant-time comparison against a stored hash. A malformed stored hash never matches.
#[must_use]
pub fn password_matches(password: &str, stored_hash: &str) -> bool {
    let Ok(stored) = hex::decode(stored_hash.trim()) else {
        return false;
    };
    let computed = Sha256::digest(password.as_bytes());
    stored.len() == computed.len() && bool::from(computed.as_slice().ct_eq(&stored))
}

pub(crate) fn new_token() -> Result<String, IamError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    fill(&mut bytes).map_err(|e| IamError::Internal {
        message: e.to_string().into(),
        context: Some("Failed to generate session token".into()),
    })?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_sha256_hex() {
        assert_eq!(hash_password("299451"), hex::encode(Sha256::digest(b"299451")));
        assert_eq!(hash_password("").len(), 64);
    }

    #[test]
    fn matching_is_exact() {
        let stored = hash_password("299451");
        assert!(password_matches("299451", &stored));
        assert!(password_matches("299451", &stored.to_ascii_uppercase()));
        assert!(!password_matches("299452", &stored));
        assert!(!password_matches("299451", "not-hex"));
        assert!(!password_matches("299451", &stored[..32]));
    }

    #[test]
    fn tokens_are_unique_hex() {
        let a = new_token().unwrap();
        let b = new_token().unwrap();
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
