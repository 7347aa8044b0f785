use crate::kinds::{SecretKind, SecretSource};
use crate::material::{MIN_MAC_KEY_LEN, decode_iv_seed, decode_record_key};
use serde::Serialize;
use std::collections::BTreeMap;
use tether_domain::config::RuntimeMode;
use tether_domain::machine::is_hex;
use zeroize::Zeroizing;

/// Which secrets are available and where they come from. Never carries values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretStatus {
    pub mode: RuntimeMode,
    pub mac_key_source: Option<SecretSource>,
    pub encryption_key_source: Option<SecretSource>,
    pub iv_seed_source: Option<SecretSource>,
    pub has_mac_key: bool,
    pub mac_key_length: usize,
    pub has_encryption_key: bool,
    pub has_iv_seed: bool,
}

/// Verdict for one secret in one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum EntryState {
    Absent,
    /// Usable and in the deployment format (32+ char MAC key, 64-hex key, 32-hex IV).
    Valid,
    /// Usable, but not in the deployment format.
    NonStandard(String),
    /// Cannot be decoded.
    Invalid(String),
}

impl EntryState {
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }
}

#[derive(Clone, Serialize)]
pub struct SourceReport {
    pub source: SecretSource,
    pub entries: BTreeMap<SecretKind, EntryState>,
    #[serde(skip)]
    decoded: BTreeMap<SecretKind, Zeroizing<Vec<u8>>>,
}

impl SourceReport {
    pub(crate) fn evaluate(
        source: SecretSource,
        mut value_of: impl FnMut(SecretKind) -> Option<String>,
    ) -> Self {
        let mut entries = BTreeMap::new();
        let mut decoded = BTreeMap::new();

        for kind in SecretKind::ALL {
            let Some(raw) = value_of(kind).map(Zeroizing::new) else {
                entries.insert(kind, EntryState::Absent);
                continue;
            };
            let (state, bytes) = classify(kind, &raw);
            if let Some(bytes) = bytes {
                decoded.insert(kind, bytes);
            }
            entries.insert(kind, state);
        }

        Self { source, entries, decoded }
    }

    #[must_use]
    pub fn state(&self, kind: SecretKind) -> &EntryState {
        self.entries.get(&kind).unwrap_or(&EntryState::Absent)
    }
}

impl std::fmt::Debug for SourceReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceReport")
            .field("source", &self.source)
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

fn classify(kind: SecretKind, raw: &str) -> (EntryState, Option<Zeroizing<Vec<u8>>>) {
    match kind {
        SecretKind::MacKey => {
            if raw.is_empty() {
                return (EntryState::Invalid("empty".to_owned()), None);
            }
            let len = raw.chars().count();
            let state = if len >= MIN_MAC_KEY_LEN {
                EntryState::Valid
            } else {
                EntryState::NonStandard(format!("{len} characters, {MIN_MAC_KEY_LEN} recommended"))
            };
            (state, Some(Zeroizing::new(raw.as_bytes().to_vec())))
        },
        SecretKind::EncryptionKey => match decode_record_key(raw) {
            Ok(bytes) => (standard_hex(raw, 64), Some(Zeroizing::new(bytes.to_vec()))),
            Err(e) => (EntryState::Invalid(e.to_string()), None),
        },
        SecretKind::IvSeed => match decode_iv_seed(raw) {
            Ok(bytes) => (standard_hex(raw, 32), Some(Zeroizing::new(bytes.to_vec()))),
            Err(e) => (EntryState::Invalid(e.to_string()), None),
        },
    }
}

fn standard_hex(raw: &str, hex_len: usize) -> EntryState {
    if raw.len() == hex_len && is_hex(raw) {
        EntryState::Valid
    } else {
        EntryState::NonStandard(format!("raw bytes, {hex_len} hex characters expected"))
    }
}

/// Per-source verdicts plus cross-source agreement.
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    pub mode: RuntimeMode,
    pub sources: Vec<SourceReport>,
    /// Secrets for which two sources supply different values.
    pub conflicts: Vec<SecretKind>,
}

impl ConsistencyReport {
    pub(crate) fn new(mode: RuntimeMode, sources: Vec<SourceReport>) -> Self {
        let conflicts = SecretKind::ALL
            .into_iter()
            .filter(|kind| {
                let mut values = sources.iter().filter_map(|s| s.decoded.get(kind));
                values.next().is_some_and(|first| values.any(|other| other != first))
            })
            .collect();
        Self { mode, sources, conflicts }
    }

    /// No undecodable value anywhere and no disagreement between sources.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.conflicts.is_empty()
            && self
                .sources
                .iter()
                .all(|s| !s.entries.values().any(|e| matches!(e, EntryState::Invalid(_))))
    }

    /// Every secret is supplied by a production-grade source in the deployment format.
    #[must_use]
    pub fn is_production_ready(&self) -> bool {
        self.is_consistent()
            && SecretKind::ALL.into_iter().all(|kind| {
                self.sources
                    .iter()
                    .filter(|s| s.source.is_production_grade())
                    .find(|s| s.state(kind).is_present())
                    .is_some_and(|s| *s.state(kind) == EntryState::Valid)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(source: SecretSource, values: [Option<&str>; 3]) -> SourceReport {
        SourceReport::evaluate(source, |kind| {
            let idx = SecretKind::ALL.iter().position(|k| *k == kind).unwrap_or_default();
            values[idx].map(str::to_owned)
        })
    }

    #[test]
    fn hex_and_raw_of_same_key_agree() {
        let raw = "0123456789abcdef0123456789abcdef";
        let hex = "30313233343536373839616263646566".repeat(2);
        let a = report(SecretSource::Embedded, [None, Some(raw), None]);
        let b = report(SecretSource::Environment, [None, Some(hex.as_str()), None]);
        assert_eq!(a.state(SecretKind::EncryptionKey), &EntryState::NonStandard(
            "raw bytes, 64 hex characters expected".to_owned()
        ));
        assert_eq!(b.state(SecretKind::EncryptionKey), &EntryState::Valid);

        let combined = ConsistencyReport::new(RuntimeMode::Test, vec![a, b]);
        assert!(combined.conflicts.is_empty());
        assert!(combined.is_consistent());
    }

    #[test]
    fn differing_mac_keys_conflict() {
        let a = report(SecretSource::Embedded, [Some("a"), None, None]);
        let b = report(SecretSource::Environment, [Some("b"), None, None]);
        let combined = ConsistencyReport::new(RuntimeMode::Test, vec![a, b]);
        assert_eq!(combined.conflicts, vec![SecretKind::MacKey]);
        assert!(!combined.is_consistent());
    }

    #[test]
    fn production_ready_needs_deployment_format() {
        let good = report(
            SecretSource::Environment,
            [Some("m".repeat(40).as_str()), Some("ab".repeat(32).as_str()), Some("cd".repeat(16).as_str())],
        );
        assert!(ConsistencyReport::new(RuntimeMode::Production, vec![good]).is_production_ready());

        let short = report(
            SecretSource::Environment,
            [Some("short"), Some("ab".repeat(32).as_str()), Some("cd".repeat(16).as_str())],
        );
        let combined = ConsistencyReport::new(RuntimeMode::Production, vec![short]);
        assert!(combined.is_consistent());
        assert!(!combined.is_production_ready());
    }

    #[test]
    fn invalid_entry_breaks_consistency() {
        let bad = report(SecretSource::Environment, [None, Some("nope"), None]);
        assert!(matches!(bad.state(SecretKind::EncryptionKey), EntryState::Invalid(_)));
        assert!(!ConsistencyReport::new(RuntimeMode::Test, vec![bad]).is_consistent());
    }
}
