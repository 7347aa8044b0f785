use aead::consts::U16;
use aes_gcm::AesGcm;
use aes_gcm::aes::Aes256;

/// AES-256-GCM instantiated with a 128-bit nonce.
pub(crate) type RecordCipher = AesGcm<Aes256, U16>;

/// Key length in bytes.
pub const KEY_LEN: usize = 32;
/// IV length in bytes. Wider than the usual 96 bits for compatibility with existing files.
pub const IV_LEN: usize = 16;
/// GCM tag length in bytes.
pub const TAG_LEN: usize = 16;
/// Shortest decodable blob: an IV and a tag around an empty ciphertext.
pub const MIN_BLOB_LEN: usize = IV_LEN + TAG_LEN;
