//! Hash-chain primitives: linking and chain integrity verification.
//!
//! Hash input layout for a transaction hash (bytes, in order):
//!   1. record_hash                (32 raw bytes)
//!   2. previous_transaction_hash  (32 raw bytes, zeros for genesis)
//!
//! Nothing else is hashed. The timestamp stored alongside an entry is
//! informational, so a chain can be recomputed from record hashes alone.

use chrono::Utc;
use sha2::{Digest as _, Sha256};

use audittrail_contracts::{ChainReport, Digest, LedgerEntry};

/// Compute `SHA-256(record_hash ‖ previous)`.
pub fn transaction_hash(record_hash: &Digest, previous: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(record_hash.as_bytes());
    hasher.update(previous.as_bytes());
    Digest(hasher.finalize().into())
}

/// Build the entry that follows `previous` at position `sequence`.
pub fn link(sequence: u64, record_hash: Digest, previous: Digest) -> LedgerEntry {
    LedgerEntry {
        sequence,
        record_hash,
        previous_transaction_hash: previous,
        transaction_hash: transaction_hash(&record_hash, &previous),
        appended_at: Utc::now(),
    }
}

/// Transaction hashes for `record_hashes` appended in order from genesis.
pub fn recompute_chain(record_hashes: &[Digest]) -> Vec<Digest> {
    let mut previous = Digest::GENESIS;
    record_hashes
        .iter()
        .map(|record_hash| {
            previous = transaction_hash(record_hash, &previous);
            previous
        })
        .collect()
}

/// Verify the integrity of a chain.
///
/// Each entry must satisfy three rules:
///
/// 1. **Position** — `sequence` equals its index.
/// 2. **Linkage** — `previous_transaction_hash` equals the preceding
///    entry's `transaction_hash` (or `Digest::GENESIS` at index 0).
/// 3. **Hash correctness** — `transaction_hash` matches the value
///    recomputed from `record_hash` and `previous_transaction_hash`.
///
/// Stops at the first violation. An empty chain is valid.
pub fn verify_chain(entries: &[LedgerEntry]) -> ChainReport {
    let mut expected_prev = Digest::GENESIS;

    for (idx, entry) in entries.iter().enumerate() {
        let idx = idx as u64;

        let failure = if entry.sequence != idx {
            Some(format!("expected sequence {}, found {}", idx, entry.sequence))
        } else if entry.previous_transaction_hash != expected_prev {
            Some(format!(
                "previous transaction hash {} does not match {}",
                entry.previous_transaction_hash, expected_prev
            ))
        } else if entry.transaction_hash
            != transaction_hash(&entry.record_hash, &entry.previous_transaction_hash)
        {
            Some(format!(
                "transaction hash {} does not match its record hash",
                entry.transaction_hash
            ))
        } else {
            None
        };

        if let Some(reason) = failure {
            return ChainReport {
                valid: false,
                length: entries.len() as u64,
                head: entries
                    .last()
                    .map(|e| e.transaction_hash)
                    .unwrap_or(Digest::GENESIS),
                first_invalid: Some(idx),
                reason: Some(reason),
            };
        }

        expected_prev = entry.transaction_hash;
    }

    ChainReport {
        valid: true,
        length: entries.len() as u64,
        head: expected_prev,
        first_invalid: None,
        reason: None,
    }
}
