use crate::error::{SecretsError, SecretsErrorExt};
use crate::kinds::{SecretKind, SecretSource};
use crate::material::{SecretSet, decode_iv_seed, decode_record_key};
use crate::report::{ConsistencyReport, EntryState, SecretStatus, SourceReport};
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tether_domain::config::RuntimeMode;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secrets compiled into the binary.
#[derive(Default, Clone, Zeroize, ZeroizeOnDrop)]
pub struct EmbeddedSecrets {
    pub mac_key: Option<String>,
    pub encryption_key: Option<String>,
    pub encryption_iv: Option<String>,
}

impl EmbeddedSecrets {
    /// Values captured from the build environment by `option_env!`.
    #[must_use]
    pub fn from_build() -> Self {
        Self {
            mac_key: option_env!("TETHER_EMBEDDED_ACTIVATION_SECRET_KEY").map(str::to_owned),
            encryption_key: option_env!("TETHER_EMBEDDED_ENCRYPTION_KEY").map(str::to_owned),
            encryption_iv: option_env!("TETHER_EMBEDDED_ENCRYPTION_IV").map(str::to_owned),
        }
    }

    fn get(&self, kind: SecretKind) -> Option<&str> {
        match kind {
            SecretKind::MacKey => self.mac_key.as_deref(),
            SecretKind::EncryptionKey => self.encryption_key.as_deref(),
            SecretKind::IvSeed => self.encryption_iv.as_deref(),
        }
    }
}

impl std::fmt::Debug for EmbeddedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedSecrets")
            .field("mac_key", &self.mac_key.is_some())
            .field("encryption_key", &self.encryption_key.is_some())
            .field("encryption_iv", &self.encryption_iv.is_some())
            .finish()
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct DevSecretsFile {
    activation_secret_key: Option<String>,
    encryption_key: Option<String>,
    encryption_iv: Option<String>,
}

impl DevSecretsFile {
    fn into_map(self) -> BTreeMap<SecretKind, String> {
        [
            (SecretKind::MacKey, self.activation_secret_key),
            (SecretKind::EncryptionKey, self.encryption_key),
            (SecretKind::IvSeed, self.encryption_iv),
        ]
        .into_iter()
        .filter_map(|(kind, value)| value.map(|v| (kind, v)))
        .collect()
    }
}

/// Resolves secrets through the precedence chain. Holds no resolved state.
pub struct SecretProvisioner {
    mode: RuntimeMode,
    embedded: EmbeddedSecrets,
    env: BTreeMap<String, String>,
    dev_file: PathBuf,
}

impl std::fmt::Debug for SecretProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretProvisioner")
            .field("mode", &self.mode)
            .field("embedded", &self.embedded)
            .field("dev_file", &self.dev_file)
            .finish_non_exhaustive()
    }
}

impl SecretProvisioner {
    /// Provisioner over the build-time embedded values and the current process environment.
    #[must_use]
    pub fn new(mode: RuntimeMode, dev_file: impl Into<PathBuf>) -> Self {
        let env = SecretKind::ALL
            .iter()
            .filter_map(|kind| {
                std::env::var(kind.env_var()).ok().map(|v| (kind.env_var().to_owned(), v))
            })
            .collect();
        Self { mode, embedded: EmbeddedSecrets::from_build(), env, dev_file: dev_file.into() }
    }

    /// Replaces the embedded source.
    #[must_use]
    pub fn with_embedded(mut self, embedded: EmbeddedSecrets) -> Self {
        self.embedded = embedded;
        self
    }

    /// Replaces the environment snapshot.
    #[must_use]
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    #[must_use]
    pub const fn mode(&self) -> RuntimeMode {
        self.mode
    }

    /// Resolves and validates all three secrets.
    ///
    /// Outside production a source whose value does not decode is skipped with a warning, and
    /// an unreadable development file is treated as absent, so resolution always ends at the
    /// built-in defaults at worst.
    ///
    /// # Errors
    /// * [`SecretsError::Missing`] in production when embedded and environment sources
    ///   leave a secret unset.
    /// * [`SecretsError::InvalidLength`] / [`SecretsError::InvalidEncoding`] in production
    ///   for malformed key material.
    pub fn initialize(&self) -> Result<SecretSet, SecretsError> {
        info!(mode = %self.mode, "Initializing secret provisioner");

        let dev = self.dev_values().unwrap_or_else(|err| {
            warn!(
                path = %self.dev_file.display(),
                error = %err,
                "Ignoring unreadable development secrets file"
            );
            BTreeMap::new()
        });

        let (mac_source, mac_key) =
            self.resolve(SecretKind::MacKey, &dev, |raw| Ok(raw.to_owned()))?;
        let (key_source, enc_key) =
            self.resolve(SecretKind::EncryptionKey, &dev, decode_record_key)?;
        let (iv_source, iv_seed) = self.resolve(SecretKind::IvSeed, &dev, decode_iv_seed)?;

        let set = SecretSet::new(mac_key, enc_key, iv_seed, [mac_source, key_source, iv_source]);
        set.validate()?;

        info!(
            mac_key = %mac_source,
            encryption_key = %key_source,
            iv_seed = %iv_source,
            "Secret provisioner initialized"
        );
        Ok(set)
    }

    /// Reports the highest-precedence source configured for each secret, without values and
    /// without failing. An unreadable development file counts as absent.
    #[must_use]
    pub fn status(&self) -> SecretStatus {
        let dev = self.dev_values().unwrap_or_default();
        let lookup = |kind| self.lookup(kind, &dev);

        let mac = lookup(SecretKind::MacKey);
        let key = lookup(SecretKind::EncryptionKey);
        let iv = lookup(SecretKind::IvSeed);

        SecretStatus {
            mode: self.mode,
            mac_key_source: mac.as_ref().map(|(s, _)| *s),
            encryption_key_source: key.as_ref().map(|(s, _)| *s),
            iv_seed_source: iv.as_ref().map(|(s, _)| *s),
            has_mac_key: mac.is_some(),
            mac_key_length: mac.as_ref().map_or(0, |(_, v)| v.chars().count()),
            has_encryption_key: key.is_some(),
            has_iv_seed: iv.is_some(),
        }
    }

    /// Checks every configured source separately and compares the values they supply.
    ///
    /// # Errors
    /// Returns [`SecretsError::DevFile`] when the development file cannot be parsed.
    pub fn inspect(&self) -> Result<ConsistencyReport, SecretsError> {
        let dev = self.dev_values()?;

        let mut sources = vec![
            SourceReport::evaluate(SecretSource::Embedded, |kind| {
                self.embedded.get(kind).map(str::to_owned)
            }),
            SourceReport::evaluate(SecretSource::Environment, |kind| self.env_value(kind)),
        ];
        if !self.mode.is_production() {
            sources.push(SourceReport::evaluate(SecretSource::DevFile, |kind| {
                dev.get(&kind).filter(|v| !v.is_empty()).cloned()
            }));
        }

        Ok(ConsistencyReport::new(self.mode, sources))
    }

    /// Walks the sources for `kind` in precedence order and returns the first one that decodes.
    fn resolve<T>(
        &self,
        kind: SecretKind,
        dev: &BTreeMap<SecretKind, String>,
        decode: impl Fn(&str) -> Result<T, SecretsError>,
    ) -> Result<(SecretSource, T), SecretsError> {
        for (source, raw) in self.candidates(kind, dev) {
            match decode(&raw).context(source.as_str()) {
                Ok(value) => {
                    if source == SecretSource::DevDefault {
                        warn!(
                            secret = kind.env_var(),
                            mode = %self.mode,
                            "Using built-in development default. NOT SECURE for production"
                        );
                    } else {
                        debug!(secret = kind.env_var(), %source, "Secret resolved");
                    }
                    return Ok((source, value));
                },
                Err(err) if self.mode.is_production() => return Err(err),
                Err(err) => {
                    warn!(secret = kind.env_var(), error = %err, "Skipping malformed secret");
                },
            }
        }

        Err(SecretsError::Missing {
            message: format!(
                "{} is required in production. Embed it at build time or set the environment variable",
                kind.env_var()
            )
            .into(),
            context: None,
        })
    }

    fn lookup(
        &self,
        kind: SecretKind,
        dev: &BTreeMap<SecretKind, String>,
    ) -> Option<(SecretSource, String)> {
        self.candidates(kind, dev).into_iter().next()
    }

    /// Every source that supplies `kind`, highest precedence first.
    fn candidates(
        &self,
        kind: SecretKind,
        dev: &BTreeMap<SecretKind, String>,
    ) -> Vec<(SecretSource, String)> {
        let mut found = Vec::with_capacity(4);
        if let Some(value) = self.embedded.get(kind).filter(|v| !v.is_empty()) {
            found.push((SecretSource::Embedded, value.to_owned()));
        }
        if let Some(value) = self.env_value(kind) {
            found.push((SecretSource::Environment, value));
        }
        if !self.mode.is_production() {
            if let Some(value) = dev.get(&kind).filter(|v| !v.is_empty()) {
                found.push((SecretSource::DevFile, value.clone()));
            }
            found.push((SecretSource::DevDefault, kind.dev_default().to_owned()));
        }
        found
    }

    fn env_value(&self, kind: SecretKind) -> Option<String> {
        self.env.get(kind.env_var()).filter(|v| !v.trim().is_empty()).map(|v| v.trim().to_owned())
    }

    fn dev_values(&self) -> Result<BTreeMap<SecretKind, String>, SecretsError> {
        if self.mode.is_production() || !self.dev_file.exists() {
            return Ok(BTreeMap::new());
        }
        let parsed = read_dev_file(&self.dev_file)?;
        debug!(path = %self.dev_file.display(), "Loaded development secrets file");
        Ok(parsed.into_map())
    }
}

fn read_dev_file(path: &Path) -> Result<DevSecretsFile, SecretsError> {
    let file = Config::builder()
        .add_source(File::from(path).format(FileFormat::Toml).required(true))
        .build()
        .context("Failed to read development secrets file")?
        .try_deserialize::<DevSecretsFile>()
        .context("Failed to parse development secrets file")?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provisioner(mode: RuntimeMode) -> SecretProvisioner {
        SecretProvisioner::new(mode, "does-not-exist.toml")
            .with_embedded(EmbeddedSecrets::default())
            .with_env(std::iter::empty::<(String, String)>())
    }

    #[test]
    fn development_falls_back_to_defaults() {
        let set = provisioner(RuntimeMode::Development).initialize().unwrap();
        assert_eq!(set.mac_key(), b"SpecialEducationMultiModalInterventionSystem2023");
        assert_eq!(set.enc_key(), b"0123456789abcdef0123456789abcdef");
        assert_eq!(set.iv_seed(), b"0123456789abcdef");
        for kind in SecretKind::ALL {
            assert_eq!(set.source(kind), SecretSource::DevDefault);
        }
    }

    #[test]
    fn production_requires_every_secret() {
        let err = provisioner(RuntimeMode::Production)
            .with_env([("ACTIVATION_SECRET_KEY", "k".repeat(32))])
            .initialize()
            .unwrap_err();
        assert!(matches!(err, SecretsError::Missing { .. }));
        assert!(err.to_string().contains("ACTIVATION_ENCRYPTION_KEY"));
    }

    #[test]
    fn malformed_secret_is_fatal_in_production() {
        let err = provisioner(RuntimeMode::Production)
            .with_env([
                ("ACTIVATION_SECRET_KEY", "k".repeat(32)),
                ("ACTIVATION_ENCRYPTION_KEY", "0123456789abcdef0123456789abcdef".to_owned()),
                ("ACTIVATION_ENCRYPTION_IV", "short".to_owned()),
            ])
            .initialize()
            .unwrap_err();
        assert_eq!(err.code(), "invalid_length");
        assert!(err.to_string().contains("environment"));
    }

    #[test]
    fn blank_environment_values_are_ignored() {
        let status = provisioner(RuntimeMode::Production)
            .with_env([("ACTIVATION_SECRET_KEY", "   ")])
            .status();
        assert!(!status.has_mac_key);
        assert_eq!(status.mac_key_source, None);
    }
}
