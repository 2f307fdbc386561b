//! Audit entry shapes shared by every sink implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::run::RunId;

/// Classifies an audit entry. One of these per logged fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Run accepted; written at `step_id = 0` before the first iteration.
    Init,
    /// The raw free-text response from the reasoning endpoint.
    LlmRaw,
    /// The observation a tool call produced, success or failure.
    ToolResult,
    /// An endpoint or parse failure, recoverable or not.
    Error,
    /// Terminal record: final answer or budget exhaustion.
    Final,
}

/// One logged fact, hash-chained to its predecessor.
///
/// Field order is load-bearing: the chain digest is computed over the
/// serialized form of the whole entry, and `serde_json` emits struct fields
/// in declaration order. Entries are immutable once written; the log is
/// append-only and nothing is ever edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Wall-clock write time (UTC).
    pub timestamp: DateTime<Utc>,
    /// The run this entry belongs to; scopes `step_id` in shared logs.
    pub run_id: RunId,
    /// The step that produced this entry.
    pub step_id: u64,
    /// What kind of fact this is.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Opaque structured data; the sink never inspects it.
    pub payload: serde_json::Value,
    /// Digest of the previous entry's serialized form, or the genesis
    /// sentinel for the first entry in the log.
    pub prev_hash: String,
}
