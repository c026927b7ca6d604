//! Ledger entries, chain verification reports and API response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::digest::Digest;

/// One committed link in the hash chain.
///
/// `transaction_hash = SHA-256(record_hash ‖ previous_transaction_hash)`.
/// `appended_at` is informational and does not contribute to any hash;
/// `sequence` is the authoritative order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// Digest of the canonical encoding of the submitted record.
    pub record_hash: Digest,

    /// `transaction_hash` of the entry at `sequence - 1`, or
    /// `Digest::GENESIS` for the first entry.
    pub previous_transaction_hash: Digest,

    /// Commitment of this entry into the chain history.
    pub transaction_hash: Digest,

    /// Wall-clock time (UTC) the entry was appended.
    pub appended_at: DateTime<Utc>,
}

/// Result of walking a chain and recomputing every link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReport {
    pub valid: bool,
    /// Number of entries inspected.
    pub length: u64,
    /// `transaction_hash` of the last entry, or genesis for an empty chain.
    pub head: Digest,
    /// Sequence of the first entry that failed a check.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_invalid: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Success body of `POST /audit`. The client must preserve both hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReceipt {
    pub record_hash: Digest,
    pub transaction_hash: Digest,
}

impl From<&LedgerEntry> for AuditReceipt {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            record_hash: entry.record_hash,
            transaction_hash: entry.transaction_hash,
        }
    }
}

/// Body of `POST /audit/verify`: whether a plaintext record was committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordVerification {
    pub record_hash: Digest,
    pub committed: bool,
    /// One transaction hash per ledger entry committing this record.
    pub transaction_hashes: Vec<Digest>,
}

/// Body of `GET /ledger`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub length: u64,
    pub head: Digest,
    pub entries: Vec<LedgerEntry>,
}
