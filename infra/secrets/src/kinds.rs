use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three provisioned secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretKind {
    MacKey,
    EncryptionKey,
    IvSeed,
}

impl SecretKind {
    pub const ALL: [Self; 3] = [Self::MacKey, Self::EncryptionKey, Self::IvSeed];

    /// Runtime environment variable.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::MacKey => "ACTIVATION_SECRET_KEY",
            Self::EncryptionKey => "ACTIVATION_ENCRYPTION_KEY",
            Self::IvSeed => "ACTIVATION_ENCRYPTION_IV",
        }
    }

    /// Build-time environment variable captured with `option_env!`.
    #[must_use]
    pub const fn embedded_var(self) -> &'static str {
        match self {
            Self::MacKey => "TETHER_EMBEDDED_ACTIVATION_SECRET_KEY",
            Self::EncryptionKey => "TETHER_EMBEDDED_ENCRYPTION_KEY",
            Self::IvSeed => "TETHER_EMBEDDED_ENCRYPTION_IV",
        }
    }

    /// Key inside the development TOML file.
    #[must_use]
    pub const fn dev_file_key(self) -> &'static str {
        match self {
            Self::MacKey => "activation_secret_key",
            Self::EncryptionKey => "encryption_key",
            Self::IvSeed => "encryption_iv",
        }
    }

    /// Insecure development fallback.
    pub(crate) const fn dev_default(self) -> &'static str {
        match self {
            Self::MacKey => "SpecialEducationMultiModalInterventionSystem2023",
            Self::EncryptionKey => "0123456789abcdef0123456789abcdef",
            Self::IvSeed => "0123456789abcdef",
        }
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.env_var())
    }
}

/// Where a resolved secret came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretSource {
    Embedded,
    Environment,
    DevFile,
    DevDefault,
    /// Handed over directly, e.g. by a command-line flag.
    Supplied,
}

impl SecretSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Environment => "environment",
            Self::DevFile => "dev_file",
            Self::DevDefault => "dev_default",
            Self::Supplied => "supplied",
        }
    }

    /// Sources a production build may rely on.
    #[must_use]
    pub const fn is_production_grade(self) -> bool {
        matches!(self, Self::Embedded | Self::Environment | Self::Supplied)
    }
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
