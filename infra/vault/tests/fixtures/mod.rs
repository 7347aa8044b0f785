use serde::{Deserialize, Serialize};
use tether_vault::Vault;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRecord {
    pub machine_code: String,
    pub activation_code: String,
    pub activated_date: String,
}

impl SampleRecord {
    #[must_use]
    pub fn new() -> Self {
        Self {
            machine_code: "ab".repeat(32),
            activation_code: "cd".repeat(32),
            activated_date: "2026-01-01T00:00:00.000Z".to_owned(),
        }
    }
}

/// Initializes a Vault instance with a fixed key for testing.
/// # Panics
/// * If Vault setup fails, the function will panic.
#[must_use]
pub fn setup_vault() -> Vault {
    Vault::builder()
        .key(b"0123456789abcdef0123456789abcdef")
        .unwrap()
        .build()
        .expect("Vault setup failed")
}
