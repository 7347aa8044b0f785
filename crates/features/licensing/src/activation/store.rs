use crate::error::{LicenseError, LicenseErrorExt};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tether_domain::activation::ActivationFile;
use tracing::debug;

/// Reads and writes the activation file.
///
/// Writes land in a sibling temp file first and are renamed over the target, so a crash
/// never leaves a half-written file behind.
#[derive(Debug, Clone)]
pub struct ActivationStore {
    path: PathBuf,
}

impl ActivationStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file. `Ok(None)` means no activation has been stored yet.
    ///
    /// # Errors
    /// * [`LicenseError::Io`] If the file exists but cannot be read.
    /// * [`LicenseError::Serialization`] If it is not an activation file.
    pub async fn load(&self) -> Result<Option<ActivationFile>, LicenseError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context(self.path.display().to_string()),
        };
        let file: ActivationFile = serde_json::from_slice(&raw).context(self.path.display().to_string())?;
        Ok(Some(file))
    }

    /// Replaces the stored file wholesale.
    ///
    /// # Errors
    /// Returns [`LicenseError::Io`] if the directory, temp file or rename fails.
    pub async fn save(&self, file: &ActivationFile) -> Result<(), LicenseError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.context("create data directory")?;
        }

        let json = serde_json::to_vec_pretty(file).context("encode activation file")?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &json).await.context(tmp.display().to_string())?;
        tokio::fs::rename(&tmp, &self.path).await.context("replace activation file")?;

        debug!(path = %self.path.display(), "Activation file written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
