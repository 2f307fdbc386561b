//! In-memory implementation of `AuditSink`.
//!
//! `MemoryAuditLog` is the reference implementation: all entries live in a
//! `Vec` behind a `Mutex`, which serializes the read-compute-append of
//! `prev_hash` exactly as the contract requires. Scripted scenarios and
//! tests use it; anything that must survive the process uses
//! `FileAuditLog` instead.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use acta_contracts::{
    audit::{AuditEntry, EventType},
    error::{ActaError, ActaResult},
    run::RunId,
};
use acta_core::traits::AuditSink;

use crate::chain::{hash_entry, verify_entries, HashAlgorithm};

// ── Internal mutable state ────────────────────────────────────────────────────

/// The mutable interior of a `MemoryAuditLog`.
pub(crate) struct ChainState {
    /// All entries written so far, in append order.
    pub(crate) entries: Vec<AuditEntry>,

    /// Digest of the last written entry, or the genesis sentinel before any
    /// entry has been written.
    pub(crate) last_hash: String,
}

// ── Export type ───────────────────────────────────────────────────────────────

/// A point-in-time snapshot of a log, sealed with its terminal hash.
///
/// The `terminal_hash` is a compact commitment to the entire log: republish
/// it out of band and any later mutation of any entry is detectable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    /// All entries in chain order.
    pub entries: Vec<AuditEntry>,

    /// Wall-clock time (UTC) the snapshot was taken.
    pub exported_at: DateTime<Utc>,

    /// Digest of the last entry, or the genesis sentinel for an empty log.
    pub terminal_hash: String,
}

// ── Public sink ───────────────────────────────────────────────────────────────

/// An in-memory, append-only audit log backed by a hash chain.
///
/// # Thread safety
///
/// `append()` and `verify()` both acquire a `Mutex` internally; one instance
/// may be shared (behind an `Arc`) by several concurrent runs and all writes
/// remain totally ordered.
pub struct MemoryAuditLog {
    algorithm: HashAlgorithm,
    pub(crate) state: Mutex<ChainState>,
}

impl MemoryAuditLog {
    /// Create an empty log chained with the given algorithm.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            state: Mutex::new(ChainState {
                entries: Vec::new(),
                last_hash: algorithm.genesis().to_string(),
            }),
        }
    }

    /// Snapshot every entry written so far, sealed with the terminal hash.
    pub fn export(&self) -> AuditExport {
        let state = self.state.lock().expect("audit state lock poisoned");
        AuditExport {
            entries: state.entries.clone(),
            exported_at: Utc::now(),
            terminal_hash: state.last_hash.clone(),
        }
    }
}

impl Default for MemoryAuditLog {
    fn default() -> Self {
        Self::new(HashAlgorithm::Sha256)
    }
}

// ── AuditSink impl ────────────────────────────────────────────────────────────

impl AuditSink for MemoryAuditLog {
    /// Append one entry to the hash chain.
    ///
    /// Stamps the entry, links it to `last_hash`, appends it, then advances
    /// `last_hash` to the new entry's digest, all under one lock so
    /// concurrent appends serialize.
    ///
    /// Returns `Err(AuditWrite)` only if the internal mutex is poisoned,
    /// which cannot happen under normal operation.
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

        let this_hash = hash_entry(self.algorithm, &entry);
        state.entries.push(entry.clone());
        state.last_hash = this_hash;

        debug!(
            run_id = %run_id.0,
            step = step_id,
            event = ?event_type,
            entries = state.entries.len(),
            "audit entry appended"
        );

        Ok(entry)
    }

    /// Recompute the chain over every entry in memory.
    ///
    /// Checks prev-hash linkage pairwise, then compares the recomputed
    /// terminal digest against the tracked `last_hash` so that tampering
    /// with the final entry is also caught.
    fn verify(&self) -> ActaResult<bool> {
        let state = self.state.lock().map_err(|e| ActaError::AuditStorage {
            reason: format!("audit state lock poisoned: {}", e),
        })?;

        if !verify_entries(self.algorithm, &state.entries) {
            return Ok(false);
        }

        let terminal = state
            .entries
            .last()
            .map(|entry| hash_entry(self.algorithm, entry))
            .unwrap_or_else(|| self.algorithm.genesis().to_string());

        Ok(terminal == state.last_hash)
    }
}
