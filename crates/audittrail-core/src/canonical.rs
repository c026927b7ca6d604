//! Canonical, order-independent encoding of an `AuditRecord`.
//!
//! Byte layout, in order:
//!   1. domain tag `audittrail/record/v1`   (field)
//!   2. actor, intent, object              (field each)
//!   3. detail count                       (8-byte big-endian)
//!   4. per detail, sorted by (key, value): key, value (field each)
//!
//! A field is an 8-byte big-endian length followed by the UTF-8 bytes.
//! Length prefixes make the encoding injective: no choice of field contents
//! can reproduce another record's bytes.

use std::collections::HashSet;

use audittrail_contracts::{AuditRecord, AuditTrailError, AuditTrailResult, DetailEntry};

const DOMAIN_TAG: &[u8] = b"audittrail/record/v1";

/// Check that a record is complete enough to be hashed.
///
/// Rejects an empty `actor`, `intent` or `object`, an empty detail key, and
/// a detail key that appears more than once.
pub fn validate(record: &AuditRecord) -> AuditTrailResult<()> {
    let header = &record.header;
    for (name, value) in [
        ("actor", &header.actor),
        ("intent", &header.intent),
        ("object", &header.object),
    ] {
        if value.is_empty() {
            return Err(AuditTrailError::Validation {
                reason: format!("header.{name} must not be empty"),
            });
        }
    }

    let mut seen = HashSet::with_capacity(record.details.len());
    for (idx, detail) in record.details.iter().enumerate() {
        if detail.key.is_empty() {
            return Err(AuditTrailError::Validation {
                reason: format!("details[{idx}].k must not be empty"),
            });
        }
        if !seen.insert(detail.key.as_str()) {
            return Err(AuditTrailError::Validation {
                reason: format!("duplicate detail key '{}'", detail.key),
            });
        }
    }

    Ok(())
}

/// Validate `record` and produce its canonical byte encoding.
pub fn encode(record: &AuditRecord) -> AuditTrailResult<Vec<u8>> {
    validate(record)?;

    let mut details: Vec<&DetailEntry> = record.details.iter().collect();
    details.sort_by(|a, b| (&a.key, &a.value).cmp(&(&b.key, &b.value)));

    let mut buf = Vec::with_capacity(encoded_len(record));
    put_field(&mut buf, DOMAIN_TAG);
    put_field(&mut buf, record.header.actor.as_bytes());
    put_field(&mut buf, record.header.intent.as_bytes());
    put_field(&mut buf, record.header.object.as_bytes());
    buf.extend_from_slice(&(details.len() as u64).to_be_bytes());
    for detail in details {
        put_field(&mut buf, detail.key.as_bytes());
        put_field(&mut buf, detail.value.as_bytes());
    }

    Ok(buf)
}

fn put_field(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
    buf.extend_from_slice(bytes);
}

fn encoded_len(record: &AuditRecord) -> usize {
    let header = &record.header;
    let fields = DOMAIN_TAG.len() + header.actor.len() + header.intent.len() + header.object.len();
    let details: usize = record
        .details
        .iter()
        .map(|d| 16 + d.key.len() + d.value.len())
        .sum();
    4 * 8 + fields + 8 + details
}
