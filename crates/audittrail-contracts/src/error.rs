//! Error taxonomy for the AuditTrail ingestion pipeline.
//!
//! All fallible operations return `AuditTrailResult<T>`. Variants are split
//! by who is at fault: `Validation` and `Transport` are the caller's and
//! never touch the ledger; `Append` and `Storage` are the service's.

use thiserror::Error;

/// The unified error type for AuditTrail.
#[derive(Debug, Error)]
pub enum AuditTrailError {
    /// The submitted record is incomplete or malformed.
    ///
    /// Raised before any hashing happens, so the ledger is never touched.
    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// The request body could not be read or is not valid JSON.
    ///
    /// Handled exactly like `Validation` at the HTTP boundary.
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// The ledger could not commit a new entry.
    ///
    /// Nothing was recorded; the caller must treat the submission as
    /// unconfirmed.
    #[error("append failed: {reason}")]
    Append { reason: String },

    /// The ledger store could not be opened, loaded or verified.
    #[error("ledger storage error: {reason}")]
    Storage { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl AuditTrailError {
    /// True for failures caused by the submitting client.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Transport { .. })
    }

    /// Stable machine-readable discriminant used in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation_error",
            Self::Transport { .. } => "transport_error",
            Self::Append { .. } => "append_error",
            Self::Storage { .. } => "storage_error",
            Self::Config { .. } => "config_error",
        }
    }
}

/// Convenience alias used throughout the AuditTrail crates.
pub type AuditTrailResult<T> = Result<T, AuditTrailError>;
