//! Well-known strings shared across crates.

/// Sentinel substituted when no usable adapter MAC exists.
pub const UNKNOWN_MAC: &str = "UNKNOWN_MAC";
/// Sentinel substituted when the CPU probe cannot resolve a value.
pub const UNKNOWN_CPU: &str = "UNKNOWN_CPU";
/// Sentinel substituted when the motherboard probe cannot resolve a value.
pub const UNKNOWN_MB: &str = "UNKNOWN_MB";
/// Sentinel substituted when the disk probe cannot resolve a value.
pub const UNKNOWN_HD: &str = "UNKNOWN_HD";

/// Bootstrap admin password for a freshly created permission file.
pub const DEFAULT_ADMIN_PASSWORD: &str = "299451";

pub const ACTION_SET_PRODUCT_NAME: &str = "setProductName";
pub const ACTION_UPLOAD_LOGO: &str = "uploadLogo";
pub const ACTION_DELETE_LOGO: &str = "deleteLogo";
pub const ACTION_SET_DEFAULT_LOGO: &str = "setDefaultLogo";
pub const ACTION_GET_USAGE_STATS: &str = "getUsageStats";

/// Length of a current machine code and of an activation code, in hex characters.
pub const HEX64_LEN: usize = 64;
/// Length of a legacy (MD5) machine code, in hex characters.
pub const LEGACY_HEX_LEN: usize = 32;
