//! # Secrets
//!
//! Resolves the three secrets the licensing core needs:
//!
//! * the activation MAC key (any non-empty string, 32+ characters recommended),
//! * the 256-bit record encryption key,
//! * the 128-bit IV seed.
//!
//! Each secret is resolved on its own. The first source that supplies it wins:
//!
//! 1. values embedded at build time (`TETHER_EMBEDDED_*`),
//! 2. the process environment (`ACTIVATION_*`),
//! 3. an unversioned TOML file (development and test only),
//! 4. fixed insecure defaults (development and test only, logged at `warn`).
//!
//! In production a secret missing from sources 1 and 2 is fatal.
//!
//! ```rust
//! use tether_domain::config::RuntimeMode;
//! use tether_secrets::{EmbeddedSecrets, SecretKind, SecretProvisioner, SecretSource};
//!
//! let secrets = SecretProvisioner::new(RuntimeMode::Development, "missing.toml")
//!     .with_embedded(EmbeddedSecrets::default())
//!     .with_env(std::iter::empty::<(String, String)>())
//!     .initialize()
//!     .unwrap();
//! assert_eq!(secrets.source(SecretKind::MacKey), SecretSource::DevDefault);
//! ```

mod error;
mod kinds;
mod material;
mod provisioner;
mod report;

pub use error::{SecretsError, SecretsErrorExt};
pub use kinds::{SecretKind, SecretSource};
pub use material::{
    GeneratedKeys, IV_SEED_LEN, MIN_MAC_KEY_LEN, RECORD_KEY_LEN, SecretSet, decode_iv_seed,
    decode_record_key, generate_keys,
};
pub use provisioner::{EmbeddedSecrets, SecretProvisioner};
pub use report::{ConsistencyReport, EntryState, SecretStatus, SourceReport};
