//! Record hashing: SHA-256 over the canonical encoding.

use sha2::{Digest as _, Sha256};

use audittrail_contracts::{AuditRecord, AuditTrailResult, Digest};

use crate::canonical;

/// Hash an already-encoded record.
pub fn hash_canonical(bytes: &[u8]) -> Digest {
    Digest(Sha256::digest(bytes).into())
}

/// Validate, encode and hash `record`, producing its `recordHash`.
///
/// Anyone holding the plaintext can call this to check it against a hash
/// returned earlier by the service.
pub fn hash_record(record: &AuditRecord) -> AuditTrailResult<Digest> {
    let bytes = canonical::encode(record)?;
    Ok(hash_canonical(&bytes))
}
