use crate::constants::{
    ACTION_DELETE_LOGO, ACTION_GET_USAGE_STATS, ACTION_SET_DEFAULT_LOGO, ACTION_SET_PRODUCT_NAME,
    ACTION_UPLOAD_LOGO,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

/// Access rule for one named action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRule {
    pub requires_auth: bool,
    #[serde(default)]
    pub description: String,
}

impl PermissionRule {
    #[must_use]
    pub fn new(requires_auth: bool, description: impl Into<String>) -> Self {
        Self { requires_auth, description: description.into() }
    }
}

/// Mapping from action name to its rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionPolicy(BTreeMap<String, PermissionRule>);

impl PermissionPolicy {
    /// Rules written to a freshly created permission file.
    #[must_use]
    pub fn default_policy() -> Self {
        let rules = [
            (ACTION_SET_PRODUCT_NAME, true, "Change product name"),
            (ACTION_UPLOAD_LOGO, true, "Upload logo"),
            (ACTION_DELETE_LOGO, true, "Delete logo"),
            (ACTION_SET_DEFAULT_LOGO, true, "Restore default logo"),
            (ACTION_GET_USAGE_STATS, false, "View usage statistics"),
        ];
        Self(
            rules
                .into_iter()
                .map(|(action, auth, desc)| (action.to_owned(), PermissionRule::new(auth, desc)))
                .collect(),
        )
    }
}

impl Deref for PermissionPolicy {
    type Target = BTreeMap<String, PermissionRule>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PermissionPolicy {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// A stored session. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub created_at: i64,
    pub expires_at: i64,
}

impl SessionRecord {
    /// A session is live strictly before its expiry instant.
    #[must_use]
    pub const fn is_live(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at
    }
}

/// Persisted permission configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionFile {
    pub admin_password_hash: String,
    pub permissions: PermissionPolicy,
    #[serde(default)]
    pub session_tokens: BTreeMap<String, SessionRecord>,
    #[serde(default)]
    pub last_updated: String,
}

/// Outcome of a permission check. A denial is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDecision {
    pub allowed: bool,
    pub message: String,
    /// Set when the caller can fix the denial by authenticating.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub requires_auth: bool,
}

impl PermissionDecision {
    #[must_use]
    pub fn allow(message: impl Into<String>) -> Self {
        Self { allowed: true, message: message.into(), requires_auth: false }
    }

    #[must_use]
    pub fn deny(message: impl Into<String>) -> Self {
        Self { allowed: false, message: message.into(), requires_auth: false }
    }

    #[must_use]
    pub fn auth_required(message: impl Into<String>) -> Self {
        Self { allowed: false, message: message.into(), requires_auth: true }
    }
}

/// How to treat an action that has no rule in the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownActionPolicy {
    /// Fail open. Every such decision is logged at `warn`.
    #[default]
    Allow,
    Deny,
}

/// Successful admin login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub token: String,
    pub expires_at: i64,
}

/// Boundary reply for an admin login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    pub message: String,
}

/// Boundary reply for a password change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub success: bool,
    pub message: String,
}
