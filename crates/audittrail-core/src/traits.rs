//! The ledger trait: the one stateful seam in the ingestion pipeline.
//!
//! The `Ingestor` only ever talks to a `Ledger`. Encoding and hashing are
//! pure functions and need no trait.

use audittrail_contracts::{AuditTrailResult, ChainReport, Digest, LedgerEntry};

/// An append-only, hash-chained store of record digests.
///
/// Implementations must serialize `append`: reading the head, computing the
/// new `transaction_hash`, storing the entry and advancing the head happen
/// as one critical section, so every entry has exactly one successor.
pub trait Ledger: Send + Sync {
    /// Commit `record_hash` as the next entry and return it.
    ///
    /// On `Err(Append)` nothing was recorded and the head is unchanged.
    fn append(&self, record_hash: Digest) -> AuditTrailResult<LedgerEntry>;

    /// Number of committed entries.
    fn len(&self) -> AuditTrailResult<u64>;

    /// `transaction_hash` of the newest entry, or `Digest::GENESIS`.
    fn head(&self) -> AuditTrailResult<Digest>;

    /// Snapshot of every entry in append order.
    fn entries(&self) -> AuditTrailResult<Vec<LedgerEntry>>;

    /// Recompute the whole chain and report the first broken link.
    fn verify(&self) -> AuditTrailResult<ChainReport>;

    fn is_empty(&self) -> AuditTrailResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Every entry committing `record_hash`, oldest first.
    ///
    /// Resubmitting the same record produces several entries.
    fn find_record(&self, record_hash: &Digest) -> AuditTrailResult<Vec<LedgerEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|entry| entry.record_hash == *record_hash)
            .collect())
    }
}
