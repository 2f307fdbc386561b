//! File-backed implementation of `AuditSink`: one JSON entry per line.
//!
//! The layout is the persisted contract: each line is the canonical JSON of
//! one `AuditEntry`, the file only ever grows, and prior lines are never
//! rewritten. Every append is synced to disk before it returns, so a crash
//! between a step and its entry cannot lose the entry.
//!
//! An existing file can be reopened: the chain is replayed and verified
//! first, and new entries extend it. `verify_file` performs the same check
//! offline against any log file, reporting the entry count and the
//! recomputed terminal hash.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use acta_contracts::{
    audit::{AuditEntry, EventType},
    error::{ActaError, ActaResult},
    run::RunId,
};
use acta_core::traits::AuditSink;

use crate::chain::{hash_entry, verify_entries, HashAlgorithm};

/// Constructor-time configuration for a file-backed log.
#[derive(Debug, Clone)]
pub struct AuditFileConfig {
    pub path: PathBuf,
    pub algorithm: HashAlgorithm,
}

impl AuditFileConfig {
    /// Configuration with the default SHA-256 chain.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            algorithm: HashAlgorithm::Sha256,
        }
    }

    /// Select a different chain digest.
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// Outcome of offline verification of a log file.
#[derive(Debug, Clone)]
pub struct FileVerification {
    /// Whether the chain is internally consistent.
    pub ok: bool,
    /// Entries read from the file.
    pub entry_count: usize,
    /// Recomputed digest of the last entry (the genesis sentinel for an
    /// empty file). Compare against an out-of-band copy to rule out
    /// truncation or replacement of the whole file.
    pub terminal_hash: String,
    /// The first problem found, when `ok` is false.
    pub detail: Option<String>,
}

// ── Internal helpers ──────────────────────────────────────────────────────────

enum ReadFailure {
    /// The storage itself failed; says nothing about chain integrity.
    Io(String),
    /// A line exists but is not a valid entry: corruption, not a storage
    /// failure.
    Decode { line: usize, detail: String },
}

fn read_entries(path: &Path) -> Result<Vec<AuditEntry>, ReadFailure> {
    let file = File::open(path)
        .map_err(|e| ReadFailure::Io(format!("cannot open '{}': {}", path.display(), e)))?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line
            .map_err(|e| ReadFailure::Io(format!("read failed at line {}: {}", index + 1, e)))?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: AuditEntry = serde_json::from_str(&line).map_err(|e| ReadFailure::Decode {
            line: index + 1,
            detail: e.to_string(),
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

// ── Internal mutable state ────────────────────────────────────────────────────

struct FileState {
    file: File,
    /// Digest of the last persisted entry, or the genesis sentinel.
    last_hash: String,
    entry_count: u64,
}

// ── Public sink ───────────────────────────────────────────────────────────────

/// An append-only JSONL audit log on disk.
///
/// All appends serialize through an internal `Mutex`, so one log may be
/// shared by several concurrent runs and the chain stays totally ordered by
/// write time.
pub struct FileAuditLog {
    path: PathBuf,
    algorithm: HashAlgorithm,
    state: Mutex<FileState>,
}

impl FileAuditLog {
    /// Start a fresh log file.
    ///
    /// Refuses to clobber an existing file: an audit trail is never
    /// overwritten. Reopen one with [`FileAuditLog::open`] instead.
    pub fn create(config: AuditFileConfig) -> ActaResult<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&config.path)
            .map_err(|e| ActaError::AuditStorage {
                reason: format!("cannot create '{}': {}", config.path.display(), e),
            })?;

        info!(path = %config.path.display(), "audit log created");
        Ok(Self {
            path: config.path,
            algorithm: config.algorithm,
            state: Mutex::new(FileState {
                file,
                last_hash: config.algorithm.genesis().to_string(),
                entry_count: 0,
            }),
        })
    }

    /// Open an existing log and resume its chain, or create a fresh one
    /// when the path does not exist yet.
    ///
    /// The whole file is replayed and verified before any append is
    /// accepted; silently extending a broken chain would make the damage
    /// permanent.
    pub fn open(config: AuditFileConfig) -> ActaResult<Self> {
        if !config.path.exists() {
            return Self::create(config);
        }

        let entries = read_entries(&config.path).map_err(|failure| match failure {
            ReadFailure::Io(reason) => ActaError::AuditStorage { reason },
            ReadFailure::Decode { line, detail } => ActaError::AuditCorrupt {
                reason: format!("line {} is not a valid entry: {}", line, detail),
            },
        })?;

        if !verify_entries(config.algorithm, &entries) {
            return Err(ActaError::AuditCorrupt {
                reason: format!("prev_hash linkage broken in '{}'", config.path.display()),
            });
        }

        let last_hash = entries
            .last()
            .map(|entry| hash_entry(config.algorithm, entry))
            .unwrap_or_else(|| config.algorithm.genesis().to_string());

        let file = OpenOptions::new()
            .append(true)
            .open(&config.path)
            .map_err(|e| ActaError::AuditStorage {
                reason: format!("cannot reopen '{}': {}", config.path.display(), e),
            })?;

        info!(
            path = %config.path.display(),
            entries = entries.len(),
            "audit log reopened, chain verified"
        );
        Ok(Self {
            path: config.path,
            algorithm: config.algorithm,
            state: Mutex::new(FileState {
                file,
                last_hash,
                entry_count: entries.len() as u64,
            }),
        })
    }

    /// Where this log lives.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Verify any log file offline, without opening it for appending.
pub fn verify_file(path: &Path, algorithm: HashAlgorithm) -> ActaResult<FileVerification> {
    let entries = match read_entries(path) {
        Ok(entries) => entries,
        Err(ReadFailure::Io(reason)) => return Err(ActaError::AuditStorage { reason }),
        Err(ReadFailure::Decode { line, detail }) => {
            return Ok(FileVerification {
                ok: false,
                entry_count: 0,
                terminal_hash: algorithm.genesis().to_string(),
                detail: Some(format!("line {} is not a valid entry: {}", line, detail)),
            })
        }
    };

    let mut expected_prev = algorithm.genesis().to_string();
    for (index, entry) in entries.iter().enumerate() {
        if entry.prev_hash != expected_prev {
            return Ok(FileVerification {
                ok: false,
                entry_count: entries.len(),
                terminal_hash: expected_prev,
                detail: Some(format!("prev_hash mismatch at entry {}", index)),
            });
        }
        expected_prev = hash_entry(algorithm, entry);
    }

    Ok(FileVerification {
        ok: true,
        entry_count: entries.len(),
        terminal_hash: expected_prev,
        detail: None,
    })
}

// ── AuditSink impl ────────────────────────────────────────────────────────────

impl AuditSink for FileAuditLog {
    /// Persist one entry: serialize, hash, write, fsync, then advance the
    /// chain, all under one lock.
    ///
    /// The digest is computed over the exact bytes written to the line, so
    /// what `verify` later recomputes from the parsed entry is the same
    /// value. `sync_data` is idempotent and retried on transient failure;
    /// the write itself cannot be safely repeated, so its failure is
    /// immediately fatal.
    fn append(
        &self,
        run_id: &RunId,
        step_id: u64,
        event_type: EventType,
        payload: serde_json::Value,
    ) -> ActaResult<AuditEntry> {
        let mut state = self.state.lock().map_err(|e| ActaError::AuditWrite {
            reason: format!("audit state lock poisoned: {}", e),
        })?;

        let entry = AuditEntry {
            timestamp: Utc::now(),
            run_id: run_id.clone(),
            step_id,
            event_type,
            payload,
            prev_hash: state.last_hash.clone(),
        };

        let mut line = serde_json::to_vec(&entry).map_err(|e| ActaError::AuditWrite {
            reason: format!("entry serialization failed: {}", e),
        })?;
        let this_hash = self.algorithm.digest(&line);
        line.push(b'\n');

        state.file.write_all(&line).map_err(|e| ActaError::AuditWrite {
            reason: format!("write to '{}' failed: {}", self.path.display(), e),
        })?;

        let mut attempts: u64 = 0;
        loop {
            match state.file.sync_data() {
                Ok(()) => break,
                Err(e) if attempts < 3 => {
                    attempts += 1;
                    warn!(error = %e, attempt = attempts, "audit fsync failed, retrying");
                    thread::sleep(Duration::from_millis(10 * attempts));
                }
                Err(e) => {
                    return Err(ActaError::AuditWrite {
                        reason: format!("fsync of '{}' failed: {}", self.path.display(), e),
                    })
                }
            }
        }

        state.last_hash = this_hash;
        state.entry_count += 1;

        debug!(
            run_id = %run_id.0,
            step = step_id,
            event = ?event_type,
            entries = state.entry_count,
            "audit entry persisted"
        );

        Ok(entry)
    }

    /// Re-read the file from disk and recompute the whole chain.
    ///
    /// Holding the lock for the duration keeps appends from interleaving
    /// with the read. An undecodable line is corruption (`Ok(false)`), not
    /// a storage failure.
    fn verify(&self) -> ActaResult<bool> {
        let state = self.state.lock().map_err(|e| ActaError::AuditStorage {
            reason: format!("audit state lock poisoned: {}", e),
        })?;

        let entries = match read_entries(&self.path) {
            Ok(entries) => entries,
            Err(ReadFailure::Io(reason)) => return Err(ActaError::AuditStorage { reason }),
            Err(ReadFailure::Decode { .. }) => return Ok(false),
        };

        if !verify_entries(self.algorithm, &entries) {
            return Ok(false);
        }

        let terminal = entries
            .last()
            .map(|entry| hash_entry(self.algorithm, entry))
            .unwrap_or_else(|| self.algorithm.genesis().to_string());

        Ok(terminal == state.last_hash)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
