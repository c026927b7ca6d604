//! # audittrail-ledger
//!
//! Append-only, SHA-256 hash-chained ledgers for AuditTrail.
//!
//! ## Overview
//!
//! Every submitted record hash becomes a `LedgerEntry` whose
//! `transaction_hash` commits to the previous entry's. Altering any stored
//! entry breaks every later link, which `verify_chain` detects.
//!
//! Two backends implement [`Ledger`](audittrail_core::Ledger):
//!
//! - [`InMemoryLedger`] — volatile, for tests and throwaway runs
//! - [`FileLedger`] — JSON lines on disk, verified on open
//!
//! ## Usage
//!
//! ```rust,ignore
//! use audittrail_ledger::FileLedger;
//! use audittrail_core::Ledger;
//!
//! let ledger = FileLedger::open("audittrail.jsonl")?;
//! let entry = ledger.append(record_hash)?;
//! assert!(ledger.verify()?.valid);
//! ```

pub mod chain;
pub mod file;
pub mod memory;

pub use chain::{link, recompute_chain, transaction_hash, verify_chain};
pub use file::{load_entries, FileLedger};
pub use memory::InMemoryLedger;

// ── Tests ─────────────────────────────────────────────────────────────────────
