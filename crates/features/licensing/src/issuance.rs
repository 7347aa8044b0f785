//! # Vendor-side Issuance
//!
//! Batch issuance and its CSV representation. Gated behind the `issuance` feature so the MAC
//! key handling for many machines at once stays out of end-user builds.
//!
//! Entries are independent: one bad machine code produces one failed row and the rest of the
//! batch is still issued.

use crate::protocol::issue;
use serde::Serialize;
use std::fmt::Write as _;
use tether_domain::machine::{MachineCode, is_hex};

/// Outcome of one batch row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Success,
    Failed,
}

impl BatchStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// One row of a batch run. `index` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub index: usize,
    pub machine_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_code: Option<String>,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary counters for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    #[must_use]
    pub fn of(entries: &[BatchEntry]) -> Self {
        let succeeded = entries.iter().filter(|e| e.status == BatchStatus::Success).count();
        Self { total: entries.len(), succeeded, failed: entries.len() - succeeded }
    }
}

/// Issues a code for every entry in `machine_codes`.
#[must_use]
pub fn issue_batch<S: AsRef<str>>(machine_codes: &[S], mac_key: &[u8]) -> Vec<BatchEntry> {
    machine_codes
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let raw = raw.as_ref().trim();
            let outcome = MachineCode::parse(raw)
                .map_err(|e| e.to_string())
                .and_then(|code| issue(&code, mac_key).map_err(|e| e.to_string()));

            match outcome {
                Ok(code) => BatchEntry {
                    index: i + 1,
                    machine_code: raw.to_owned(),
                    activation_code: Some(code.into()),
                    status: BatchStatus::Success,
                    error: None,
                },
                Err(error) => BatchEntry {
                    index: i + 1,
                    machine_code: raw.to_owned(),
                    activation_code: None,
                    status: BatchStatus::Failed,
                    error: Some(error),
                },
            }
        })
        .collect()
}

/// Machine codes from a CSV or plain list: the first column of each non-blank line.
///
/// Columns split on `,` or tab. A first line that is not a hex value is taken as a header.
#[must_use]
pub fn parse_batch_input(content: &str) -> Vec<String> {
    let mut codes: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split([',', '\t']).next().unwrap_or_default().trim().trim_matches('"').to_owned())
        .collect();

    if codes.first().is_some_and(|first| !is_hex(first)) {
        codes.remove(0);
    }
    codes.retain(|code| !code.is_empty());
    codes
}

/// Renders entries as `index,machineCode,activationCode,status,error`.
#[must_use]
pub fn render_csv(entries: &[BatchEntry]) -> String {
    let mut out = String::from("index,machineCode,activationCode,status,error\n");
    for entry in entries {
        let _ = writeln!(
            out,
            "{},\"{}\",\"{}\",{},{}",
            entry.index,
            entry.machine_code.replace('"', "\"\""),
            entry.activation_code.as_deref().unwrap_or_default(),
            entry.status.as_str(),
            entry.error.as_ref().map(|e| format!("\"{}\"", e.replace('"', "\"\""))).unwrap_or_default(),
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_rows_are_independent() {
        let key = b"k".repeat(32);
        let good = "ab".repeat(32);
        let entries = issue_batch(&[good.as_str(), "not-a-code", "cd".repeat(16).as_str()], &key);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].status, BatchStatus::Success);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[1].status, BatchStatus::Failed);
        assert!(entries[1].error.as_deref().unwrap().contains("64 or 32"));
        assert_eq!(entries[2].status, BatchStatus::Failed);
        assert!(entries[2].error.as_deref().unwrap().contains("legacy"));

        assert_eq!(BatchSummary::of(&entries), BatchSummary { total: 3, succeeded: 1, failed: 2 });
    }

    #[test]
    fn header_is_skipped_only_when_not_hex() {
        let with_header = format!("machine_code,customer\n{},acme\n\n{}\t x\n", "a".repeat(64), "b".repeat(64));
        assert_eq!(parse_batch_input(&with_header), ["a".repeat(64), "b".repeat(64)]);

        let bare = format!("{}\n", "c".repeat(64));
        assert_eq!(parse_batch_input(&bare), ["c".repeat(64)]);
    }

    #[test]
    fn csv_quotes_codes_and_errors() {
        let entries = issue_batch(&["xyz"], b"key");
        let csv = render_csv(&entries);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("index,machineCode,activationCode,status,error"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,\"xyz\",\"\",failed,\""));
    }
}
