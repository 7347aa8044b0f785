//! # IAM
//!
//! Gate for privileged actions. An admin password opens a short-lived bearer session, and
//! each named action either needs such a session or not.
//!
//! All state lives in one JSON file owned by a single task ([`PermissionStore`]). Callers
//! talk to it through [`IamHandle`], which is cheap to clone.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tether_iam::{IamSettings, PermissionStore};
//! use tether_kernel::time::SystemClock;
//!
//! # async fn run(settings: IamSettings) {
//! let iam = PermissionStore::spawn(settings, Arc::new(SystemClock));
//! let grant = iam.verify_admin_password("299451").await;
//! # }
//! ```

mod actor;
mod error;
mod handle;
mod password;
mod store;

pub use crate::error::{IamError, IamErrorExt};
pub use actor::{IamSettings, PermissionStore};
pub use handle::IamHandle;
pub use password::{hash_password, password_matches};
