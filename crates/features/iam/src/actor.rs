use crate::error::IamError;
use crate::handle::IamHandle;
use crate::password::{hash_password, new_token, password_matches};
use crate::store::{PermissionFileStore, bootstrap_file};
use std::path::PathBuf;
use std::time::Duration;
use tether_domain::config::TetherConfig;
use tether_domain::permissions::{
    PermissionDecision, PermissionFile, PermissionPolicy, PermissionRule, SessionGrant,
    SessionRecord, UnknownActionPolicy,
};
use tether_kernel::redact;
use tether_kernel::time::SharedClock;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

const CHANNEL_CAPACITY: usize = 32;

/// Settings for the permission store.
#[derive(Debug, Clone)]
pub struct IamSettings {
    pub permissions_path: PathBuf,
    pub session_ttl: Duration,
    pub unknown_action: UnknownActionPolicy,
}

impl From<&TetherConfig> for IamSettings {
    fn from(config: &TetherConfig) -> Self {
        Self {
            permissions_path: config.storage.permissions_path(),
            session_ttl: Duration::from_secs(config.iam.session_ttl_secs),
            unknown_action: config.iam.unknown_action,
        }
    }
}

pub(crate) enum Command {
    VerifyPassword { password: String, reply: oneshot::Sender<Result<SessionGrant, IamError>> },
    CheckPermission { action: String, token: Option<String>, reply: oneshot::Sender<PermissionDecision> },
    RevokeSession { token: String, reply: oneshot::Sender<bool> },
    UpdatePassword { old: String, new: String, reply: oneshot::Sender<Result<(), IamError>> },
    ClearSessions { reply: oneshot::Sender<Result<(), IamError>> },
    Policy { reply: oneshot::Sender<Result<PermissionPolicy, IamError>> },
    SetPermission { action: String, rule: PermissionRule, reply: oneshot::Sender<Result<(), IamError>> },
}

/// Single owner of the permission file.
///
/// Runs as one tokio task. Every read and every read-modify-write of the file happens here,
/// so concurrent administrative requests are applied one at a time. Mutations are written to
/// disk before they become visible in memory.
#[derive(Debug)]
pub struct PermissionStore {
    store: PermissionFileStore,
    settings: IamSettings,
    clock: SharedClock,
    state: Option<PermissionFile>,
}

impl PermissionStore {
    /// Spawns the store on the current runtime and returns its client handle.
    ///
    /// The task stops once every handle is dropped.
    #[must_use]
    pub fn spawn(settings: IamSettings, clock: SharedClock) -> IamHandle {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let actor = Self {
            store: PermissionFileStore::new(settings.permissions_path.clone()),
            settings,
            clock,
            state: None,
        };
        tokio::spawn(actor.run(rx));
        IamHandle::new(tx)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        if let Err(e) = self.ensure_loaded().await {
            error!(path = %self.store.path().display(), error = %e, "Permission configuration unavailable");
        }
        while let Some(command) = rx.recv().await {
            self.handle(command).await;
        }
        debug!("Permission store stopped");
    }

    async fn handle(&mut self, command: Command) {
        // A dropped reply receiver only means the caller went away.
        match command {
            Command::VerifyPassword { password, reply } => {
                let _ = reply.send(self.verify_password(&password).await);
            },
            Command::CheckPermission { action, token, reply } => {
                let _ = reply.send(self.check_permission(&action, token.as_deref()).await);
            },
            Command::RevokeSession { token, reply } => {
                let _ = reply.send(self.revoke_session(&token).await);
            },
            Command::UpdatePassword { old, new, reply } => {
                let _ = reply.send(self.update_password(&old, &new).await);
            },
            Command::ClearSessions { reply } => {
                let _ = reply.send(self.clear_sessions().await);
            },
            Command::Policy { reply } => {
                let _ = reply.send(self.current().await.map(|file| file.permissions.clone()));
            },
            Command::SetPermission { action, rule, reply } => {
                let _ = reply.send(self.set_permission(action, rule).await);
            },
        }
    }

    /// Loads the file, creating it with defaults on first run.
    ///
    /// A file that exists but cannot be parsed is left alone: overwriting it would silently
    /// restore the bootstrap password.
    async fn ensure_loaded(&mut self) -> Result<(), IamError> {
        if self.state.is_some() {
            return Ok(());
        }
        match self.store.load().await? {
            Some(file) => self.state = Some(file),
            None => {
                self.commit(bootstrap_file(self.clock.now_rfc3339())).await?;
                info!(path = %self.store.path().display(), "Permission configuration initialized");
            },
        }
        Ok(())
    }

    async fn current(&mut self) -> Result<&PermissionFile, IamError> {
        self.ensure_loaded().await?;
        self.state.as_ref().ok_or_else(|| IamError::Unavailable {
            message: "permission file not loaded".into(),
            context: None,
        })
    }

    async fn commit(&mut self, mut next: PermissionFile) -> Result<(), IamError> {
        next.last_updated = self.clock.now_rfc3339();
        self.store.save(&next).await?;
        self.state = Some(next);
        Ok(())
    }

    fn ttl_ms(&self) -> i64 {
        i64::try_from(self.settings.session_ttl.as_millis()).unwrap_or(i64::MAX)
    }

    async fn verify_password(&mut self, password: &str) -> Result<SessionGrant, IamError> {
        let now = self.clock.now_ms();
        let expires_at = now.saturating_add(self.ttl_ms());
        let file = self.current().await?;

        if !password_matches(password, &file.admin_password_hash) {
            warn!("Admin password verification failed");
            return Err(IamError::InvalidPassword {
                message: "Incorrect password, please try again".into(),
                context: None,
            });
        }

        let token = new_token()?;
        let mut next = file.clone();
        next.session_tokens.retain(|_, session| session.is_live(now));
        next.session_tokens.insert(token.clone(), SessionRecord { created_at: now, expires_at });
        self.commit(next).await?;

        info!(token = redact(&token), "Admin session opened");
        Ok(SessionGrant { token, expires_at })
    }

    async fn check_permission(&mut self, action: &str, token: Option<&str>) -> PermissionDecision {
        let now = self.clock.now_ms();
        let unknown_action = self.settings.unknown_action;
        let file = match self.current().await {
            Ok(file) => file,
            Err(e) => {
                warn!(action, error = %e, "Permission check without configuration");
                return PermissionDecision::deny("Permission configuration not found");
            },
        };

        let Some(rule) = file.permissions.get(action) else {
            return match unknown_action {
                UnknownActionPolicy::Allow => {
                    warn!(action, "Unknown action allowed by default");
                    PermissionDecision::allow("No restriction for this action")
                },
                UnknownActionPolicy::Deny => {
                    warn!(action, "Unknown action denied");
                    PermissionDecision::deny("Unknown action")
                },
            };
        };
        if !rule.requires_auth {
            return PermissionDecision::allow("No authentication required");
        }

        let Some(token) = token else {
            return PermissionDecision::auth_required("Admin authentication required");
        };
        match file.session_tokens.get(token).map(|session| session.is_live(now)) {
            Some(true) => PermissionDecision::allow("Permission granted"),
            Some(false) => {
                let mut next = file.clone();
                next.session_tokens.remove(token);
                if let Err(e) = self.commit(next).await {
                    warn!(error = %e, "Failed to evict expired session");
                }
                debug!(token = redact(token), "Expired session evicted");
                PermissionDecision::auth_required("Admin authentication required")
            },
            None => PermissionDecision::auth_required("Admin authentication required"),
        }
    }

    async fn revoke_session(&mut self, token: &str) -> bool {
        let file = match self.current().await {
            Ok(file) if file.session_tokens.contains_key(token) => file,
            _ => return false,
        };
        let mut next = file.clone();
        next.session_tokens.remove(token);
        match self.commit(next).await {
            Ok(()) => {
                info!(token = redact(token), "Session revoked");
                true
            },
            Err(e) => {
                error!(error = %e, "Failed to revoke session");
                false
            },
        }
    }

    async fn update_password(&mut self, old: &str, new: &str) -> Result<(), IamError> {
        if new.is_empty() {
            return Err(IamError::InvalidInput {
                message: "New password must not be empty".into(),
                context: None,
            });
        }
        let file = self.current().await?;
        if !password_matches(old, &file.admin_password_hash) {
            warn!("Old password verification failed when updating admin password");
            return Err(IamError::InvalidPassword {
                message: "Old password is incorrect".into(),
                context: None,
            });
        }

        let mut next = file.clone();
        next.admin_password_hash = hash_password(new);
        next.session_tokens.clear();
        self.commit(next).await?;

        info!("Admin password updated, all sessions cleared");
        Ok(())
    }

    async fn clear_sessions(&mut self) -> Result<(), IamError> {
        let mut next = self.current().await?.clone();
        next.session_tokens.clear();
        self.commit(next).await?;
        info!("All sessions cleared");
        Ok(())
    }

    async fn set_permission(&mut self, action: String, rule: PermissionRule) -> Result<(), IamError> {
        if action.trim().is_empty() {
            return Err(IamError::InvalidInput { message: "Action name must not be empty".into(), context: None });
        }
        let mut next = self.current().await?.clone();
        info!(action = %action, requires_auth = rule.requires_auth, "Permission rule updated");
        next.permissions.insert(action, rule);
        self.commit(next).await
    }
}
