use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Advisory verdict of the virtualization scan. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmVerdict {
    pub is_virtual_machine: bool,
    pub indicators: BTreeSet<String>,
    /// Weighted score, capped at 100.
    pub confidence: u8,
}
