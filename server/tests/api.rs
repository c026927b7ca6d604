//! Contract tests for the AuditTrail HTTP API.
//!
//! Each test builds a router over a fresh ledger and drives it with
//! `tower::ServiceExt::oneshot`; no socket is bound.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use audittrail_config::{LedgerBackend, LedgerSection};
use audittrail_contracts::{AuditTrailError, AuditTrailResult, ChainReport, Digest, LedgerEntry};
use audittrail_core::Ledger;
use audittrail_ledger::InMemoryLedger;
use audittrail_server::{create_router, open_ledger, AppState};

struct TestApp {
    app: Router,
    ledger: Arc<dyn Ledger>,
}

fn build_app() -> TestApp {
    let ledger: Arc<dyn Ledger> = Arc::new(InMemoryLedger::new());
    let app = create_router(AppState::new(ledger.clone()));
    TestApp { app, ledger }
}

/// A ledger whose storage always fails to commit.
struct BrokenLedger;

impl Ledger for BrokenLedger {
    fn append(&self, _record_hash: Digest) -> AuditTrailResult<LedgerEntry> {
        Err(AuditTrailError::Append {
            reason: "disk full".to_string(),
        })
    }

    fn len(&self) -> AuditTrailResult<u64> {
        Ok(0)
    }

    fn head(&self) -> AuditTrailResult<Digest> {
        Ok(Digest::GENESIS)
    }

    fn entries(&self) -> AuditTrailResult<Vec<LedgerEntry>> {
        Ok(Vec::new())
    }

    fn verify(&self) -> AuditTrailResult<ChainReport> {
        Ok(ChainReport {
            valid: true,
            length: 0,
            head: Digest::GENESIS,
            first_invalid: None,
            reason: None,
        })
    }
}

fn peter(details: Value) -> Value {
    json!({
        "header": { "actor": "Peter", "intent": "Create", "object": "obj-1" },
        "details": details
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(app, "POST", uri, Some(body.to_string())).await
}

fn is_hex_digest(value: &Value) -> bool {
    value
        .as_str()
        .map(|s| s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()))
        .unwrap_or(false)
}

// ── POST /audit ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_submit_returns_both_hashes() {
    let TestApp { app, ledger } = build_app();

    let (status, body) = post_json(
        &app,
        "/audit",
        &peter(json!([{ "k": "a", "v": "1" }, { "k": "b", "v": "2" }])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(is_hex_digest(&body["recordHash"]), "bad body: {body}");
    assert!(is_hex_digest(&body["transactionHash"]), "bad body: {body}");
    assert_eq!(ledger.len().unwrap(), 1);
    assert_eq!(
        body["transactionHash"],
        json!(ledger.head().unwrap().to_hex())
    );
}

/// The same record with reordered details: identical recordHash, two
/// distinct ledger entries.
#[tokio::test]
async fn test_reordered_details_share_record_hash() {
    let TestApp { app, ledger } = build_app();

    let (_, first) = post_json(
        &app,
        "/audit",
        &peter(json!([{ "k": "a", "v": "1" }, { "k": "b", "v": "2" }])),
    )
    .await;
    let (_, second) = post_json(
        &app,
        "/audit",
        &peter(json!([{ "k": "b", "v": "2" }, { "k": "a", "v": "1" }])),
    )
    .await;

    assert_eq!(first["recordHash"], second["recordHash"]);
    assert_ne!(first["transactionHash"], second["transactionHash"]);
    assert_eq!(ledger.len().unwrap(), 2);
}

#[tokio::test]
async fn test_details_may_be_omitted() {
    let TestApp { app, .. } = build_app();
    let body = json!({ "header": { "actor": "Mike", "intent": "Read", "object": "obj-9" } });

    let (status, _) = post_json(&app, "/audit", &body).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_empty_actor_is_client_error_without_ledger_effect() {
    let TestApp { app, ledger } = build_app();
    let body = json!({
        "header": { "actor": "", "intent": "Create", "object": "obj-1" },
        "details": []
    });

    let (status, error) = post_json(&app, "/audit", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], json!("validation_error"));
    assert!(error["message"].as_str().unwrap().contains("actor"));
    assert_eq!(ledger.len().unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_detail_key_is_client_error() {
    let TestApp { app, ledger } = build_app();

    let (status, error) = post_json(
        &app,
        "/audit",
        &peter(json!([{ "k": "a", "v": "1" }, { "k": "a", "v": "2" }])),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], json!("validation_error"));
    assert_eq!(ledger.len().unwrap(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_transport_error() {
    let TestApp { app, ledger } = build_app();

    let (status, error) = send(&app, "POST", "/audit", Some("{\"header\": ".to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], json!("transport_error"));
    assert_eq!(ledger.len().unwrap(), 0);
}

#[tokio::test]
async fn test_missing_header_field_is_validation_error() {
    let TestApp { app, ledger } = build_app();
    let body = json!({ "header": { "actor": "Peter", "intent": "Create" }, "details": [] });

    let (status, error) = post_json(&app, "/audit", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], json!("validation_error"));
    assert_eq!(ledger.len().unwrap(), 0);
}

#[tokio::test]
async fn test_missing_content_type_is_transport_error() {
    let TestApp { app, .. } = build_app();
    let request = Request::builder()
        .method("POST")
        .uri("/audit")
        .body(Body::from(peter(json!([])).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_append_failure_is_server_error() {
    let app = create_router(AppState::new(Arc::new(BrokenLedger)));

    let (status, error) = post_json(&app, "/audit", &peter(json!([{ "k": "a", "v": "1" }]))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error["error"], json!("append_error"));
    assert!(error["message"].as_str().unwrap().contains("disk full"));
}

/// Parallel submissions still form one linear chain.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_form_linear_chain() {
    let TestApp { app, ledger } = build_app();

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let body = json!({
                    "header": { "actor": "John", "intent": "Update", "object": format!("obj-{i}") },
                    "details": [{ "k": "n", "v": i.to_string() }]
                });
                post_json(&app, "/audit", &body).await
            })
        })
        .collect();

    for task in tasks {
        let (status, _) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    let entries = ledger.entries().unwrap();
    assert_eq!(entries.len(), 32);
    let predecessors: HashSet<_> = entries.iter().map(|e| e.previous_transaction_hash).collect();
    assert_eq!(predecessors.len(), 32);
    assert!(ledger.verify().unwrap().valid);
}

// ── POST /audit/verify ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_verify_record_reports_commitments() {
    let TestApp { app, ledger } = build_app();
    let record = peter(json!([{ "k": "a", "v": "1" }]));

    let (status, before) = post_json(&app, "/audit/verify", &record).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(before["committed"], json!(false));

    let (_, receipt) = post_json(&app, "/audit", &record).await;

    let (status, after) = post_json(&app, "/audit/verify", &record).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["committed"], json!(true));
    assert_eq!(after["recordHash"], receipt["recordHash"]);
    assert_eq!(
        after["transactionHashes"],
        Value::Array(vec![receipt["transactionHash"].clone()])
    );
    assert_eq!(ledger.len().unwrap(), 1, "verification must not append");
}

#[tokio::test]
async fn test_verify_record_rejects_invalid_record() {
    let TestApp { app, .. } = build_app();
    let body = json!({ "header": { "actor": "Peter", "intent": "", "object": "obj-1" } });

    let (status, error) = post_json(&app, "/audit/verify", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"], json!("validation_error"));
}

// ── GET /ledger, GET /ledger/verify ───────────────────────────────────────────

#[tokio::test]
async fn test_ledger_snapshot_lists_entries_in_order() {
    let TestApp { app, .. } = build_app();
    let (_, first) = post_json(&app, "/audit", &peter(json!([{ "k": "a", "v": "1" }]))).await;
    let (_, second) = post_json(&app, "/audit", &peter(json!([{ "k": "a", "v": "2" }]))).await;

    let (status, snapshot) = send(&app, "GET", "/ledger", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["length"], json!(2));
    assert_eq!(snapshot["head"], second["transactionHash"]);
    let entries = snapshot["entries"].as_array().unwrap();
    assert_eq!(entries[0]["sequence"], json!(0));
    assert_eq!(entries[0]["previousTransactionHash"], json!("0".repeat(64)));
    assert_eq!(entries[0]["transactionHash"], first["transactionHash"]);
    assert_eq!(entries[1]["previousTransactionHash"], first["transactionHash"]);
}

#[tokio::test]
async fn test_ledger_verify_on_intact_chain() {
    let TestApp { app, .. } = build_app();
    for i in 0..3 {
        post_json(&app, "/audit", &peter(json!([{ "k": "i", "v": i.to_string() }]))).await;
    }

    let (status, report) = send(&app, "GET", "/ledger/verify", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["valid"], json!(true));
    assert_eq!(report["length"], json!(3));
}

/// A ledger file edited behind the service's back is reported as a
/// conflict.
#[tokio::test]
async fn test_ledger_verify_on_tampered_file() {
    let dir = tempfile::tempdir().unwrap();
    let section = LedgerSection {
        backend: LedgerBackend::File,
        path: dir.path().join("ledger.jsonl"),
    };
    let app = create_router(AppState::new(open_ledger(&section).unwrap()));

    let mut receipts = Vec::new();
    for i in 0..3 {
        let (_, receipt) =
            post_json(&app, "/audit", &peter(json!([{ "k": "i", "v": i.to_string() }]))).await;
        receipts.push(receipt);
    }

    let original = receipts[1]["recordHash"].as_str().unwrap().to_string();
    let contents = std::fs::read_to_string(&section.path).unwrap();
    std::fs::write(&section.path, contents.replacen(&original, &"f".repeat(64), 1)).unwrap();

    let (status, report) = send(&app, "GET", "/ledger/verify", None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(report["valid"], json!(false));
    assert_eq!(report["firstInvalid"], json!(1));
}

#[tokio::test]
async fn test_healthz() {
    let TestApp { app, .. } = build_app();
    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ── File backend ──────────────────────────────────────────────────────────────

/// A restarted service continues the chain from the file on disk.
#[tokio::test]
async fn test_file_ledger_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let section = LedgerSection {
        backend: LedgerBackend::File,
        path: dir.path().join("ledger.jsonl"),
    };

    let first = {
        let app = create_router(AppState::new(open_ledger(&section).unwrap()));
        let (status, body) = post_json(&app, "/audit", &peter(json!([]))).await;
        assert_eq!(status, StatusCode::OK);
        body
    };

    let ledger = open_ledger(&section).unwrap();
    let app = create_router(AppState::new(ledger.clone()));
    let (_, second) = post_json(&app, "/audit", &peter(json!([]))).await;

    let entries = ledger.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(
        json!(entries[1].previous_transaction_hash.to_hex()),
        first["transactionHash"]
    );
    assert_eq!(json!(entries[1].transaction_hash.to_hex()), second["transactionHash"]);
}
