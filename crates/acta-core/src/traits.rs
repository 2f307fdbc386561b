//! Core trait definitions for the ACTA decision loop.
//!
//! These four traits define the complete trust boundary:
//!
//! - `ReasoningClient` — untrusted source (free text from a language model)
//! - `ActionParser`    — trusted decoder (free text to a structured action)
//! - `Tool`            — semi-trusted handler (deterministic, but fallible)
//! - `AuditSink`       — trusted sink (records every event immutably)
//!
//! The orchestrator wires them together. Nothing a `ReasoningClient` returns
//! is ever acted on until the parser has produced a typed `Action`, and no
//! effect of any step proceeds until the audit sink has committed an entry
//! for it.

use acta_contracts::{
    action::Action,
    audit::{AuditEntry, EventType},
    error::{ActaResult, EndpointError, ParseError, ToolError},
    observation::Record,
    run::RunId,
};

/// A synchronous request/response boundary to the reasoning endpoint.
///
/// Implementations are **untrusted**: the response is arbitrary free text
/// and every call may fail. The per-call deadline lives inside the
/// implementation (configured at construction); expiry surfaces as
/// [`EndpointError::Timeout`]. Reasoning is stateless-input-driven, so the
/// orchestrator may safely re-issue an identical request after a failure.
pub trait ReasoningClient: Send + Sync {
    /// Send one prompt and return the model's raw free-text response.
    fn complete(&self, system: &str, prompt: &str) -> Result<String, EndpointError>;
}

/// Decodes a model's free-text response into a structured [`Action`].
///
/// Implementations are **trusted** and must be pure: same text in, same
/// result out, no I/O. This is the primary place unreliable external input
/// meets the system; a `ParseError` here is normal loop traffic, never a
/// fault.
pub trait ActionParser: Send + Sync {
    /// Parse `raw_text` into exactly one action variant.
    fn parse(&self, raw_text: &str) -> Result<Action, ParseError>;
}

/// One callable tool behind the registry.
///
/// Handlers must be deterministic with respect to their backing data and
/// must express every failure through [`ToolError`]: the registry converts
/// errors into failure observations, and a panic inside a handler is a bug,
/// not a supported failure mode.
pub trait Tool: Send + Sync {
    /// Registry identifier (e.g. "sql_extractor"). Stable across runs.
    fn name(&self) -> &str;

    /// One-line description rendered into the model's tool listing.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's input, or `None` for no structural
    /// constraint. The registry validates model-supplied input against this
    /// before `invoke` runs.
    fn input_schema(&self) -> Option<serde_json::Value> {
        None
    }

    /// Execute the tool against validated input.
    fn invoke(&self, input: &serde_json::Value) -> Result<Vec<Record>, ToolError>;
}

/// The audit sink: the immutable, hash-chained record of the run.
///
/// Every loop transition produces at least one entry, committed before the
/// orchestrator proceeds. A failed `append` is fatal to the run: a step that
/// cannot be audited cannot happen. Implementations serialize concurrent
/// appends internally (mutual exclusion around the read-compute-append of
/// `prev_hash`), so one sink may be shared by several concurrent runs.
pub trait AuditSink: Send + Sync {
    /// Append one entry to the log and return it as written.
    ///
    /// Must not fail for transient I/O: implementations retry internally and
    /// surface only a fatal storage error.
    fn append(
        &self,
        run_id: &RunId,
        step_id: u64,
        event_type: EventType,
        payload: serde_json::Value,
    ) -> ActaResult<AuditEntry>;

    /// Recompute the hash chain over every entry written so far.
    ///
    /// `Ok(false)` means tampering or corruption; `Err` means the storage
    /// itself could not be read. The two are never conflated.
    fn verify(&self) -> ActaResult<bool>;
}
