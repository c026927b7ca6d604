//! Loading and validating `ServiceConfig` documents.

use std::path::Path;

use tracing::debug;

use audittrail_contracts::{AuditTrailError, AuditTrailResult};

use crate::config::{LedgerBackend, ServiceConfig};

impl ServiceConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `AuditTrailError::Config` if the TOML is malformed, contains
    /// unknown keys, or describes an unusable ledger.
    pub fn from_toml_str(s: &str) -> AuditTrailResult<Self> {
        let config: ServiceConfig = toml::from_str(s).map_err(|e| AuditTrailError::Config {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as a TOML service config.
    pub fn from_file(path: &Path) -> AuditTrailResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AuditTrailError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!(
            path = %path.display(),
            bind = %config.server.bind,
            backend = ?config.ledger.backend,
            "service config loaded"
        );
        Ok(config)
    }

    /// Reject combinations that parse but cannot run.
    pub fn validate(&self) -> AuditTrailResult<()> {
        if self.ledger.backend == LedgerBackend::File && self.ledger.path.as_os_str().is_empty() {
            return Err(AuditTrailError::Config {
                reason: "ledger.path must be set when ledger.backend = \"file\"".to_string(),
            });
        }
        Ok(())
    }
}
