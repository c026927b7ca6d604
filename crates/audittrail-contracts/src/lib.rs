//! # audittrail-contracts
//!
//! Shared types for the AuditTrail service: the submitted record, the
//! ledger entry it becomes, the `Digest` both are keyed by, and the error
//! taxonomy.
//!
//! All crates in the workspace import from here. No hashing or storage
//! logic lives in this crate.

pub mod digest;
pub mod error;
pub mod ledger;
pub mod record;

pub use digest::{Digest, DIGEST_LEN};
pub use error::{AuditTrailError, AuditTrailResult};
pub use ledger::{AuditReceipt, ChainReport, LedgerEntry, LedgerSnapshot, RecordVerification};
pub use record::{AuditHeader, AuditRecord, DetailEntry};
