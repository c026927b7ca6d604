//! HTTP handlers.
//!
//! Ledger work runs on the blocking pool: `FileLedger::append` syncs to
//! disk while holding the ledger lock.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use audittrail_contracts::{
    AuditReceipt, AuditRecord, AuditTrailError, AuditTrailResult, ChainReport, Digest,
    LedgerSnapshot, RecordVerification,
};

use crate::{error::ApiError, AppState};

async fn run_blocking<T, F>(f: F) -> AuditTrailResult<T>
where
    F: FnOnce() -> AuditTrailResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuditTrailError::Storage {
            reason: format!("ledger task aborted: {}", e),
        })?
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// `POST /audit` — commit a record and return both hashes.
pub async fn submit_audit(
    State(st): State<AppState>,
    payload: Result<Json<AuditRecord>, JsonRejection>,
) -> Result<Json<AuditReceipt>, ApiError> {
    let Json(record) = payload?;
    let ingestor = st.ingestor.clone();
    let receipt = run_blocking(move || ingestor.ingest(&record)).await?;
    Ok(Json(receipt))
}

/// `POST /audit/verify` — recompute a plaintext record's hash and report
/// whether the ledger holds it.
pub async fn verify_record(
    State(st): State<AppState>,
    payload: Result<Json<AuditRecord>, JsonRejection>,
) -> Result<Json<RecordVerification>, ApiError> {
    let Json(record) = payload?;
    let ingestor = st.ingestor.clone();
    let verification = run_blocking(move || ingestor.check(&record)).await?;
    Ok(Json(verification))
}

/// `GET /ledger` — every entry in append order.
pub async fn ledger_snapshot(State(st): State<AppState>) -> Result<Json<LedgerSnapshot>, ApiError> {
    let ingestor = st.ingestor.clone();
    let snapshot = run_blocking(move || {
        let ledger = ingestor.ledger();
        let entries = ledger.entries()?;
        Ok(LedgerSnapshot {
            length: entries.len() as u64,
            head: entries
                .last()
                .map(|e| e.transaction_hash)
                .unwrap_or(Digest::GENESIS),
            entries,
        })
    })
    .await?;
    Ok(Json(snapshot))
}

/// `GET /ledger/verify` — 200 with the report when the chain is intact,
/// 409 when it is not.
pub async fn verify_ledger(
    State(st): State<AppState>,
) -> Result<(StatusCode, Json<ChainReport>), ApiError> {
    let ingestor = st.ingestor.clone();
    let report = run_blocking(move || ingestor.ledger().verify()).await?;
    let status = if report.valid {
        StatusCode::OK
    } else {
        tracing::warn!(
            first_invalid = ?report.first_invalid,
            reason = ?report.reason,
            "ledger chain verification failed"
        );
        StatusCode::CONFLICT
    };
    Ok((status, Json(report)))
}
