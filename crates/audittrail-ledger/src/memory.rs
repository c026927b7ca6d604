//! In-memory implementation of `Ledger`.
//!
//! `InMemoryLedger` keeps every entry in a `Vec` behind a `Mutex`. It is
//! the default for tests and for `serve --memory`; nothing survives a
//! restart.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use audittrail_contracts::{AuditTrailError, AuditTrailResult, ChainReport, Digest, LedgerEntry};
use audittrail_core::Ledger;

use crate::chain::{link, verify_chain};

// ── Chain state shared by every backend ──────────────────────────────────────

/// Entries plus the cached head, always updated together.
#[derive(Debug, Default)]
pub(crate) struct ChainState {
    pub(crate) entries: Vec<LedgerEntry>,
    pub(crate) head: Option<Digest>,
}

impl ChainState {
    /// Adopt entries that were already verified.
    pub(crate) fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        let head = entries.last().map(|e| e.transaction_hash);
        Self { entries, head }
    }

    pub(crate) fn head(&self) -> Digest {
        self.head.unwrap_or(Digest::GENESIS)
    }

    /// The entry `record_hash` would become. Does not mutate.
    pub(crate) fn next(&self, record_hash: Digest) -> LedgerEntry {
        link(self.entries.len() as u64, record_hash, self.head())
    }

    pub(crate) fn commit(&mut self, entry: LedgerEntry) {
        self.head = Some(entry.transaction_hash);
        self.entries.push(entry);
    }
}

pub(crate) fn poisoned<E: std::fmt::Display>(err: E) -> AuditTrailError {
    AuditTrailError::Storage {
        reason: format!("ledger state lock poisoned: {}", err),
    }
}

// ── Public ledger ────────────────────────────────────────────────────────────

/// A volatile, append-only ledger.
///
/// # Thread safety
///
/// `append()` holds the internal `Mutex` from reading the head until the
/// new entry is stored, so concurrent appends form one linear chain.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    pub(crate) state: Mutex<ChainState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AuditTrailResult<MutexGuard<'_, ChainState>> {
        self.state.lock().map_err(poisoned)
    }
}

impl Ledger for InMemoryLedger {
    fn append(&self, record_hash: Digest) -> AuditTrailResult<LedgerEntry> {
        let mut state = self.state.lock().map_err(|e| AuditTrailError::Append {
            reason: format!("ledger state lock poisoned: {}", e),
        })?;

        let entry = state.next(record_hash);
        state.commit(entry.clone());

        debug!(
            sequence = entry.sequence,
            transaction_hash = %entry.transaction_hash,
            "entry appended to in-memory ledger"
        );

        Ok(entry)
    }

    fn len(&self) -> AuditTrailResult<u64> {
        Ok(self.lock()?.entries.len() as u64)
    }

    fn head(&self) -> AuditTrailResult<Digest> {
        Ok(self.lock()?.head())
    }

    fn entries(&self) -> AuditTrailResult<Vec<LedgerEntry>> {
        Ok(self.lock()?.entries.clone())
    }

    fn verify(&self) -> AuditTrailResult<ChainReport> {
        Ok(verify_chain(&self.lock()?.entries))
    }
}
