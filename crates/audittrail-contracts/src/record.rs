//! Audit record types, exactly as submitted on the wire.
//!
//! ```json
//! {
//!   "header":  { "actor": "Peter", "intent": "Create", "object": "obj-1" },
//!   "details": [ { "k": "a", "v": "1" }, { "k": "b", "v": "2" } ]
//! }
//! ```
//!
//! The service never stores these; only their digest reaches the ledger.

use serde::{Deserialize, Serialize};

/// Who did what to which object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditHeader {
    /// The user or system performing the action.
    pub actor: String,
    /// What the actor is doing (e.g. "Create", "Delete").
    pub intent: String,
    /// Opaque identifier of the thing acted upon.
    pub object: String,
}

impl AuditHeader {
    pub fn new(
        actor: impl Into<String>,
        intent: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            actor: actor.into(),
            intent: intent.into(),
            object: object.into(),
        }
    }
}

/// One free-form key/value detail attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DetailEntry {
    #[serde(rename = "k")]
    pub key: String,
    #[serde(rename = "v")]
    pub value: String,
}

impl DetailEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A complete submission: one header plus details in submission order.
///
/// Detail order carries no meaning. The canonical encoder sorts details
/// before hashing, so any permutation yields the same `recordHash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub header: AuditHeader,
    #[serde(default)]
    pub details: Vec<DetailEntry>,
}

impl AuditRecord {
    pub fn new(header: AuditHeader, details: Vec<DetailEntry>) -> Self {
        Self { header, details }
    }
}
