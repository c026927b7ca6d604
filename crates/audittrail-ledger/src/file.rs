//! Durable, JSON-lines implementation of `Ledger`.
//!
//! One serialized `LedgerEntry` per line, in append order. The file is
//! loaded and verified in full when opened; a ledger that fails
//! verification is refused rather than extended.
//!
//! An append is committed only once its line has been written and synced.
//! If any step of the write fails the file is truncated back to its
//! previous length and the in-memory head is left where it was.
//!
//! `verify` re-reads the file rather than trusting the in-memory copy, so
//! edits made to the file while the service runs are reported.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};

use audittrail_contracts::{AuditTrailError, AuditTrailResult, ChainReport, Digest, LedgerEntry};
use audittrail_core::Ledger;

use crate::chain::verify_chain;
use crate::memory::{poisoned, ChainState};

struct FileState {
    chain: ChainState,
    file: File,
    /// Byte length of the file up to and including the last committed line.
    committed_len: u64,
}

/// An append-only ledger persisted to a JSON-lines file.
pub struct FileLedger {
    path: PathBuf,
    state: Mutex<FileState>,
}

impl FileLedger {
    /// Open (or create) the ledger at `path` and verify its chain.
    ///
    /// Returns `AuditTrailError::Storage` if the file cannot be opened, a
    /// line is not a valid entry, or the chain fails verification.
    ///
    /// A well-formed last entry missing its newline is terminated so the
    /// next append starts on its own line. A torn last line does not parse
    /// and is refused like any other bad line.
    pub fn open(path: impl AsRef<Path>) -> AuditTrailResult<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&path)
            .map_err(|e| storage(&path, format!("cannot open: {}", e)))?;

        let entries = load_entries(&path)?;
        let report = verify_chain(&entries);
        if !report.valid {
            return Err(storage(
                &path,
                format!(
                    "chain broken at sequence {}: {}",
                    report.first_invalid.unwrap_or_default(),
                    report.reason.unwrap_or_default()
                ),
            ));
        }

        if missing_final_newline(&path)? {
            write_line(&mut file, b"\n")
                .map_err(|e| storage(&path, format!("cannot terminate last line: {}", e)))?;
            warn!(path = %path.display(), "ledger file lacked a final newline; terminated it");
        }

        let committed_len = file
            .metadata()
            .map_err(|e| storage(&path, format!("cannot stat: {}", e)))?
            .len();

        info!(
            path = %path.display(),
            entries = entries.len(),
            head = %report.head,
            "ledger file opened"
        );

        Ok(Self {
            path,
            state: Mutex::new(FileState {
                chain: ChainState::from_entries(entries),
                file,
                committed_len,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> AuditTrailResult<MutexGuard<'_, FileState>> {
        self.state.lock().map_err(poisoned)
    }

    /// Append using `write` to put the line on disk.
    ///
    /// `write` may fail after writing part of the line; the file is cut back
    /// to `committed_len` either way.
    fn append_with<W>(&self, record_hash: Digest, write: W) -> AuditTrailResult<LedgerEntry>
    where
        W: FnOnce(&mut File, &[u8]) -> io::Result<()>,
    {
        let mut guard = self.state.lock().map_err(|e| AuditTrailError::Append {
            reason: format!("ledger state lock poisoned: {}", e),
        })?;
        let state = &mut *guard;

        let entry = state.chain.next(record_hash);
        let mut line = serde_json::to_vec(&entry).map_err(|e| AuditTrailError::Append {
            reason: format!("cannot serialize entry: {}", e),
        })?;
        line.push(b'\n');

        if let Err(e) = write(&mut state.file, &line) {
            if let Err(rollback) = state.file.set_len(state.committed_len) {
                warn!(
                    path = %self.path.display(),
                    error = %rollback,
                    "failed to truncate partial ledger line"
                );
            }
            return Err(AuditTrailError::Append {
                reason: format!("{}: write failed: {}", self.path.display(), e),
            });
        }

        state.committed_len += line.len() as u64;
        state.chain.commit(entry.clone());

        Ok(entry)
    }
}

/// Read every entry from `path` without checking the chain.
///
/// Blank lines are skipped. Used by `open` and by the offline `verify`
/// command, which wants a report rather than an error for a broken chain.
pub fn load_entries(path: &Path) -> AuditTrailResult<Vec<LedgerEntry>> {
    let file = File::open(path).map_err(|e| storage(path, format!("cannot read: {}", e)))?;

    let mut entries = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| storage(path, format!("read failed at line {}: {}", idx + 1, e)))?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: LedgerEntry = serde_json::from_str(&line)
            .map_err(|e| storage(path, format!("line {} is not a ledger entry: {}", idx + 1, e)))?;
        entries.push(entry);
    }
    Ok(entries)
}

fn storage(path: &Path, reason: String) -> AuditTrailError {
    AuditTrailError::Storage {
        reason: format!("{}: {}", path.display(), reason),
    }
}

fn missing_final_newline(path: &Path) -> AuditTrailResult<bool> {
    let mut file = File::open(path).map_err(|e| storage(path, format!("cannot read: {}", e)))?;
    let len = file
        .metadata()
        .map_err(|e| storage(path, format!("cannot stat: {}", e)))?
        .len();
    if len == 0 {
        return Ok(false);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))
        .and_then(|_| file.read_exact(&mut last))
        .map_err(|e| storage(path, format!("cannot read last byte: {}", e)))?;
    Ok(last[0] != b'\n')
}

/// Index of the first committed entry the file no longer agrees with.
fn first_divergence(committed: &[LedgerEntry], on_disk: &[LedgerEntry]) -> Option<u64> {
    let mismatch = committed.iter().zip(on_disk).position(|(ours, theirs)| {
        ours.sequence != theirs.sequence
            || ours.record_hash != theirs.record_hash
            || ours.transaction_hash != theirs.transaction_hash
    });
    match mismatch {
        Some(idx) => Some(idx as u64),
        None if committed.len() != on_disk.len() => {
            Some(committed.len().min(on_disk.len()) as u64)
        }
        None => None,
    }
}

fn write_line(file: &mut File, line: &[u8]) -> io::Result<()> {
    file.write_all(line)?;
    file.flush()?;
    file.sync_data()
}

impl Ledger for FileLedger {
    fn append(&self, record_hash: Digest) -> AuditTrailResult<LedgerEntry> {
        self.append_with(record_hash, write_line)
    }

    fn len(&self) -> AuditTrailResult<u64> {
        Ok(self.lock()?.chain.entries.len() as u64)
    }

    fn head(&self) -> AuditTrailResult<Digest> {
        Ok(self.lock()?.chain.head())
    }

    fn entries(&self) -> AuditTrailResult<Vec<LedgerEntry>> {
        Ok(self.lock()?.chain.entries.clone())
    }

    /// Re-read the file under the lock and check it both as a chain and
    /// against the entries this process committed.
    fn verify(&self) -> AuditTrailResult<ChainReport> {
        let state = self.lock()?;
        let committed = &state.chain.entries;

        let on_disk = match load_entries(&self.path) {
            Ok(entries) => entries,
            Err(e) => {
                return Ok(ChainReport {
                    valid: false,
                    length: committed.len() as u64,
                    head: state.chain.head(),
                    first_invalid: None,
                    reason: Some(e.to_string()),
                })
            }
        };

        let report = verify_chain(&on_disk);
        if !report.valid {
            return Ok(report);
        }

        match first_divergence(committed, &on_disk) {
            Some(idx) => Ok(ChainReport {
                valid: false,
                first_invalid: Some(idx),
                reason: Some(format!(
                    "entry {} on disk differs from the committed chain ({} committed, {} on disk)",
                    idx,
                    committed.len(),
                    on_disk.len()
                )),
                ..report
            }),
            None => Ok(report),
        }
    }
}
