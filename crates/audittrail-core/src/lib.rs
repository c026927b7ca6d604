//! # audittrail-core
//!
//! The record-hashing side of AuditTrail.
//!
//! This crate provides:
//! - The `Ledger` trait, the only stateful seam in the pipeline
//! - The canonical encoder and record hasher (pure functions)
//! - The `Ingestor` that drives a submission through validate → encode →
//!   hash → append
//!
//! ## Usage
//!
//! ```rust,ignore
//! use audittrail_core::Ingestor;
//!
//! let ingestor = Ingestor::new(ledger);
//! let receipt = ingestor.ingest(&record)?;
//! println!("{} {}", receipt.record_hash, receipt.transaction_hash);
//! ```

pub mod canonical;
pub mod hasher;
pub mod ingest;
pub mod traits;

pub use hasher::{hash_canonical, hash_record};
pub use ingest::{IngestStage, Ingestor};
pub use traits::Ledger;
