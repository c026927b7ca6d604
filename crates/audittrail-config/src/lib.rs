//! # audittrail-config
//!
//! TOML-driven configuration for the AuditTrail service.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use audittrail_config::ServiceConfig;
//!
//! let config = ServiceConfig::from_file(Path::new("audittrail.toml"))?;
//! println!("listening on {}", config.server.bind);
//! ```
//!
//! Command-line flags override individual values after loading.

pub mod config;
mod loader;

pub use config::{
    LedgerBackend, LedgerSection, ServerSection, ServiceConfig, DEFAULT_BIND, DEFAULT_LEDGER_PATH,
};

// ── Tests ─────────────────────────────────────────────────────────────────────
