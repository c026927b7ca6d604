//! The ingestion pipeline: the only path from a submitted record to a
//! ledger entry.
//!
//!   Received → Validated → Encoded → Hashed → Appended → Responded
//!
//! A record that fails validation never reaches the ledger. The ledger is
//! reached exactly once per accepted record; there is no retry and no
//! deduplication, so a resubmission becomes a new entry.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use audittrail_contracts::{AuditReceipt, AuditRecord, AuditTrailResult, RecordVerification};

use crate::{canonical, hasher, traits::Ledger};

/// Where a submission is in the pipeline. Used for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Received,
    Validated,
    Encoded,
    Hashed,
    Appended,
    Responded,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Encoded => "encoded",
            Self::Hashed => "hashed",
            Self::Appended => "appended",
            Self::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// Drives submissions through the pipeline against a shared ledger.
///
/// Cheap to share: clone the `Arc<Ingestor>` into each request handler.
/// Encoding and hashing run without any lock; only `Ledger::append`
/// serializes.
pub struct Ingestor {
    ledger: Arc<dyn Ledger>,
}

impl Ingestor {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Commit one record and return its two hashes.
    ///
    /// # Errors
    ///
    /// `Validation` if the record is incomplete (ledger untouched);
    /// `Append` if the ledger could not commit (nothing recorded).
    pub fn ingest(&self, record: &AuditRecord) -> AuditTrailResult<AuditReceipt> {
        let mut stage = IngestStage::Received;
        debug!(
            %stage,
            actor = %record.header.actor,
            intent = %record.header.intent,
            details = record.details.len(),
            "audit record received"
        );

        // ── Validate + encode ────────────────────────────────────────────────
        let bytes = match canonical::encode(record) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(%stage, error = %e, "audit record rejected");
                return Err(e);
            }
        };
        stage = IngestStage::Validated;
        debug!(%stage, "audit record validated");
        stage = IngestStage::Encoded;
        debug!(%stage, bytes = bytes.len(), "audit record encoded");

        // ── Hash ─────────────────────────────────────────────────────────────
        let record_hash = hasher::hash_canonical(&bytes);
        stage = IngestStage::Hashed;
        debug!(%stage, record_hash = %record_hash, "audit record hashed");

        // ── Append ───────────────────────────────────────────────────────────
        let entry = match self.ledger.append(record_hash) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(%stage, record_hash = %record_hash, error = %e, "ledger append failed");
                return Err(e);
            }
        };
        stage = IngestStage::Appended;
        info!(
            %stage,
            sequence = entry.sequence,
            record_hash = %entry.record_hash,
            transaction_hash = %entry.transaction_hash,
            "audit record committed"
        );

        let receipt = AuditReceipt::from(&entry);
        stage = IngestStage::Responded;
        debug!(%stage, sequence = entry.sequence, "receipt issued");

        Ok(receipt)
    }

    /// Recompute the `recordHash` of a plaintext record and look it up.
    ///
    /// Never appends.
    pub fn check(&self, record: &AuditRecord) -> AuditTrailResult<RecordVerification> {
        let record_hash = hasher::hash_record(record)?;
        let matches = self.ledger.find_record(&record_hash)?;

        debug!(
            record_hash = %record_hash,
            matches = matches.len(),
            "plaintext record checked against ledger"
        );

        Ok(RecordVerification {
            record_hash,
            committed: !matches.is_empty(),
            transaction_hashes: matches.iter().map(|e| e.transaction_hash).collect(),
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
