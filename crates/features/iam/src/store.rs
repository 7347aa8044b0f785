use crate::error::{IamError, IamErrorExt};
use crate::password::hash_password;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tether_domain::constants::DEFAULT_ADMIN_PASSWORD;
use tether_domain::permissions::{PermissionFile, PermissionPolicy};

/// The permission file on disk. Only the actor touches it.
#[derive(Debug, Clone)]
pub(crate) struct PermissionFileStore {
    path: PathBuf,
}

impl PermissionFileStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) async fn load(&self) -> Result<Option<PermissionFile>, IamError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).context(self.path.display().to_string()),
        };
        let file: PermissionFile =
            serde_json::from_slice(&raw).context(self.path.display().to_string())?;
        Ok(Some(file))
    }

    /// Writes through a temp file and a rename.
    pub(crate) async fn save(&self, file: &PermissionFile) -> Result<(), IamError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.context("create config directory")?;
        }
        let json = serde_json::to_vec_pretty(file).context("encode permission file")?;

        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);

        tokio::fs::write(&tmp, &json).await.context(tmp.display().to_string())?;
        tokio::fs::rename(&tmp, &self.path).await.context("replace permission file")
    }
}

/// Contents of a freshly created permission file.
pub(crate) fn bootstrap_file(now_rfc3339: String) -> PermissionFile {
    PermissionFile {
        admin_password_hash: hash_password(DEFAULT_ADMIN_PASSWORD),
        permissions: PermissionPolicy::default_policy(),
        session_tokens: BTreeMap::new(),
        last_updated: now_rfc3339,
    }
}
