//! # acta-audit
//!
//! Hash-chained, append-only audit sinks for orchestrator runs.
//!
//! Every entry carries the digest of its predecessor's serialized form,
//! starting from an all-zeros genesis sentinel. Editing, deleting, or
//! reordering an earlier entry breaks the linkage carried by its successor.
//! The last entry has no successor, so each sink also tracks the digest of
//! the most recent write and `verify` compares against that.
//!
//! Two sinks implement `acta_core::traits::AuditSink`:
//!
//! - [`MemoryAuditLog`] keeps the chain in process memory. Cheap, and the
//!   default for tests and throwaway runs.
//! - [`FileAuditLog`] persists one JSON entry per line and fsyncs each
//!   append. Files can be reopened (the chain is replayed and verified
//!   first) and checked offline with [`verify_file`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use acta_audit::{AuditFileConfig, FileAuditLog};
//! use acta_core::traits::AuditSink;
//!
//! let log = FileAuditLog::create(AuditFileConfig::new("audit_trail.jsonl"))?;
//! log.append(&run_id, 0, EventType::Init, payload)?;
//! assert!(log.verify()?);
//! ```

pub mod chain;
pub mod file;
pub mod memory;

pub use chain::{hash_entry, verify_entries, HashAlgorithm, GENESIS_SHA256, GENESIS_SHA512};
pub use file::{verify_file, AuditFileConfig, FileAuditLog, FileVerification};
pub use memory::{AuditExport, MemoryAuditLog};

// ── Tests ────────────────────────────────────────────────────────────────────
