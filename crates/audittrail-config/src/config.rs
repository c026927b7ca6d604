//! Service configuration schema.
//!
//! Every field has a default, so an empty document is a valid config that
//! serves on `127.0.0.1:8585` with a file ledger at `audittrail.jsonl`.
//!
//! Example:
//! ```toml
//! [server]
//! bind = "0.0.0.0:8585"
//!
//! [ledger]
//! backend = "file"
//! path = "/var/lib/audittrail/ledger.jsonl"
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Address the demo client posts to by default.
pub const DEFAULT_BIND: &str = "127.0.0.1:8585";

/// Ledger file used when none is configured.
pub const DEFAULT_LEDGER_PATH: &str = "audittrail.jsonl";

/// Where committed entries are kept.
///
/// Expressed in TOML as `backend = "memory"` or `backend = "file"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LedgerBackend {
    /// Volatile; the chain restarts from genesis on every launch.
    Memory,
    /// JSON-lines file at `LedgerSection::path`.
    #[default]
    File,
}

/// The `[server]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Socket address the HTTP listener binds to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// The `[ledger]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerSection {
    #[serde(default)]
    pub backend: LedgerBackend,

    /// Ignored when `backend = "memory"`.
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::default(),
            path: default_ledger_path(),
        }
    }
}

/// The top-level structure deserialized from a TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub ledger: LedgerSection,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8585))
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from(DEFAULT_LEDGER_PATH)
}
