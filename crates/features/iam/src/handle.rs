use crate::actor::Command;
use crate::error::IamError;
use tether_domain::permissions::{PermissionDecision, PermissionPolicy, PermissionRule, SessionGrant};
use tokio::sync::{mpsc, oneshot};

/// Cloneable client of the [`PermissionStore`](crate::PermissionStore) task.
#[derive(Debug, Clone)]
pub struct IamHandle {
    tx: mpsc::Sender<Command>,
}

impl IamHandle {
    pub(crate) const fn new(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, IamError> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(build(reply)).await.map_err(|_| IamError::closed())?;
        rx.await.map_err(|_| IamError::closed())
    }

    /// Opens an admin session.
    ///
    /// # Errors
    /// * [`IamError::InvalidPassword`] For a wrong password.
    /// * [`IamError::Io`] If the session cannot be persisted.
    pub async fn verify_admin_password(&self, password: &str) -> Result<SessionGrant, IamError> {
        let password = password.to_owned();
        self.request(|reply| Command::VerifyPassword { password, reply }).await?
    }

    /// Decides whether `action` may run. Never fails: an unreachable store denies.
    pub async fn check_permission(&self, action: &str, token: Option<&str>) -> PermissionDecision {
        let (action, token) = (action.to_owned(), token.map(str::to_owned));
        self.request(|reply| Command::CheckPermission { action, token, reply })
            .await
            .unwrap_or_else(|_| PermissionDecision::deny("Permission service unavailable"))
    }

    /// Ends one session. Returns false when the token was not known.
    pub async fn revoke_session(&self, token: &str) -> bool {
        let token = token.to_owned();
        self.request(|reply| Command::RevokeSession { token, reply }).await.unwrap_or(false)
    }

    /// Replaces the admin password and ends every session.
    ///
    /// # Errors
    /// * [`IamError::InvalidPassword`] If `old` is wrong.
    /// * [`IamError::InvalidInput`] If `new` is empty.
    pub async fn update_admin_password(&self, old: &str, new: &str) -> Result<(), IamError> {
        let (old, new) = (old.to_owned(), new.to_owned());
        self.request(|reply| Command::UpdatePassword { old, new, reply }).await?
    }

    /// # Errors
    /// Returns an error if the file cannot be written or the store has stopped.
    pub async fn clear_all_sessions(&self) -> Result<(), IamError> {
        self.request(|reply| Command::ClearSessions { reply }).await?
    }

    /// Snapshot of the current rules.
    ///
    /// # Errors
    /// Returns an error if the configuration is unavailable or the store has stopped.
    pub async fn policy(&self) -> Result<PermissionPolicy, IamError> {
        self.request(|reply| Command::Policy { reply }).await?
    }

    /// Adds or replaces the rule for `action`.
    ///
    /// # Errors
    /// Returns an error for an empty action name or a failed write.
    pub async fn set_permission(&self, action: &str, rule: PermissionRule) -> Result<(), IamError> {
        let action = action.to_owned();
        self.request(|reply| Command::SetPermission { action, rule, reply }).await?
    }
}
