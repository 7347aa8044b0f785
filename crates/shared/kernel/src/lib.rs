//! Kernel utilities shared across slices.
//! Keep this crate lightweight: layered config loading and the clock abstraction that makes
//! session expiry testable.
//!
//! ## Config loading
//! ```rust,no_run
//! use tether_kernel::config::load_config;
//! use tether_kernel::domain::config::TetherConfig;
//!
//! let cfg: TetherConfig = load_config(Some("tether.toml")).unwrap_or_default();
//! assert!(cfg.hardware.timeout_ms > 0);
//! ```
pub mod config;
pub mod time;

pub use tether_domain as domain;

const REDACTED_LEN: usize = 8;

/// Shortens an identifier for log output (first 8 characters).
#[must_use]
pub fn redact(value: &str) -> &str {
    value.char_indices().nth(REDACTED_LEN).map_or(value, |(end, _)| &value[..end])
}

#[cfg(test)]
mod tests {
    use super::redact;

    #[test]
    fn redact_keeps_prefix() {
        assert_eq!(redact("0123456789abcdef"), "01234567");
        assert_eq!(redact("abc"), "abc");
    }

    #[test]
    fn redact_counts_characters_not_bytes() {
        assert_eq!(redact("ключ-сессии-секрет"), "ключ-сес");
        assert_eq!(redact("aaaaaaa\u{e9}bbbb"), "aaaaaaa\u{e9}");
    }
}
