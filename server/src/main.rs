//! AuditTrail — service entry point and operator CLI.
//!
//! Usage:
//!   audittrail serve [--config audittrail.toml] [--bind 127.0.0.1:8585] [--ledger PATH | --memory]
//!   audittrail verify audittrail.jsonl
//!   audittrail hash submission.json

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use audittrail_config::{LedgerBackend, ServiceConfig};
use audittrail_contracts::{AuditRecord, AuditTrailError, AuditTrailResult};
use audittrail_server::{create_router, open_ledger, AppState};

// ── CLI definition ────────────────────────────────────────────────────────────

/// AuditTrail — hash-chained audit record ingestion.
#[derive(Parser)]
#[command(
    name = "audittrail",
    version,
    about = "Hash-chained audit record ingestion service",
    long_about = "Accepts audit records over HTTP, hashes them canonically and commits\n\
                  each hash to an append-only SHA-256 chain."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP ingestion service.
    Serve {
        /// TOML config file. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override `server.bind`.
        #[arg(long)]
        bind: Option<SocketAddr>,
        /// Override `ledger.path` and use the file backend.
        #[arg(long, conflicts_with = "memory")]
        ledger: Option<PathBuf>,
        /// Keep the ledger in memory only.
        #[arg(long)]
        memory: bool,
    },
    /// Recompute every link of a ledger file and print the report.
    Verify {
        /// Path to a JSON-lines ledger file.
        ledger: PathBuf,
    },
    /// Print the recordHash of a submission body without contacting a server.
    Hash {
        /// JSON file in the `POST /audit` body format.
        submission: PathBuf,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set RUST_LOG=debug for per-stage pipeline logging.
    let default_level = match cli.command {
        Command::Serve { .. } => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let result = match cli.command {
        Command::Serve {
            config,
            bind,
            ledger,
            memory,
        } => serve(config.as_deref(), bind, ledger, memory).await,
        Command::Verify { ledger } => verify(&ledger),
        Command::Hash { submission } => hash(&submission),
    };

    if let Err(e) = result {
        eprintln!("audittrail: {}", e);
        std::process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn serve(
    config_path: Option<&Path>,
    bind: Option<SocketAddr>,
    ledger: Option<PathBuf>,
    memory: bool,
) -> AuditTrailResult<()> {
    let mut config = match config_path {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(path) = ledger {
        config.ledger.backend = LedgerBackend::File;
        config.ledger.path = path;
    }
    if memory {
        config.ledger.backend = LedgerBackend::Memory;
    }
    config.validate()?;

    let ledger = open_ledger(&config.ledger)?;
    let app = create_router(AppState::new(ledger));

    let listener = tokio::net::TcpListener::bind(config.server.bind)
        .await
        .map_err(|e| AuditTrailError::Config {
            reason: format!("cannot bind {}: {}", config.server.bind, e),
        })?;

    info!(
        bind = %config.server.bind,
        backend = ?config.ledger.backend,
        "audittrail listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AuditTrailError::Config {
            reason: format!("http server stopped: {}", e),
        })?;

    info!("audittrail shut down");
    Ok(())
}

fn verify(path: &Path) -> AuditTrailResult<()> {
    let entries = audittrail_ledger::load_entries(path)?;
    let report = audittrail_ledger::verify_chain(&entries);

    let rendered = serde_json::to_string_pretty(&report).map_err(|e| AuditTrailError::Storage {
        reason: format!("cannot render report: {}", e),
    })?;
    println!("{}", rendered);

    if report.valid {
        Ok(())
    } else {
        Err(AuditTrailError::Storage {
            reason: format!(
                "{}: chain broken at sequence {}",
                path.display(),
                report.first_invalid.unwrap_or_default()
            ),
        })
    }
}

fn hash(path: &Path) -> AuditTrailResult<()> {
    let body = std::fs::read_to_string(path).map_err(|e| AuditTrailError::Transport {
        reason: format!("cannot read '{}': {}", path.display(), e),
    })?;
    let record: AuditRecord = serde_json::from_str(&body).map_err(|e| AuditTrailError::Transport {
        reason: format!("'{}' is not a submission body: {}", path.display(), e),
    })?;

    let record_hash = audittrail_core::hash_record(&record)?;
    println!("{}", record_hash);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
}
