//! # audittrail-server
//!
//! The HTTP face of AuditTrail.
//!
//! | Method | Path             | Purpose                                     |
//! |--------|------------------|---------------------------------------------|
//! | POST   | `/audit`         | commit a record, return both hashes         |
//! | POST   | `/audit/verify`  | check a plaintext record against the ledger |
//! | GET    | `/ledger`        | export every entry                          |
//! | GET    | `/ledger/verify` | recompute the chain                         |
//! | GET    | `/healthz`       | liveness                                    |

pub mod api;
pub mod error;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use audittrail_config::{LedgerBackend, LedgerSection};
use audittrail_contracts::AuditTrailResult;
use audittrail_core::{Ingestor, Ledger};
use audittrail_ledger::{FileLedger, InMemoryLedger};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<Ingestor>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ingestor: Arc::new(Ingestor::new(ledger)),
        }
    }
}

/// Open the ledger described by the `[ledger]` config table.
pub fn open_ledger(section: &LedgerSection) -> AuditTrailResult<Arc<dyn Ledger>> {
    let ledger: Arc<dyn Ledger> = match section.backend {
        LedgerBackend::Memory => Arc::new(InMemoryLedger::new()),
        LedgerBackend::File => Arc::new(FileLedger::open(&section.path)?),
    };
    Ok(ledger)
}

/// Build the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/audit", post(api::submit_audit))
        .route("/audit/verify", post(api::verify_record))
        .route("/ledger", get(api::ledger_snapshot))
        .route("/ledger/verify", get(api::verify_ledger))
        .route("/healthz", get(api::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
