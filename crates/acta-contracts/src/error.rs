//! Runtime error types for the ACTA decision loop.
//!
//! All fallible operations in the ACTA crates return `ActaResult<T>`.
//! Error variants carry enough context to produce actionable audit entries.
//! Recoverable failures (bad tool names, malformed model output, handler
//! errors) never appear here: they are absorbed into the loop as
//! observations. An `ActaError` always means the run is over.

use thiserror::Error;

/// The unified fatal error type for the ACTA runtime.
#[derive(Debug, Error)]
pub enum ActaError {
    /// The caller supplied an objective the loop cannot run.
    #[error("invalid objective: {reason}")]
    InvalidObjective { reason: String },

    /// The reasoning endpoint failed twice for the same step.
    ///
    /// One intra-step retry is always attempted first; reasoning is
    /// stateless-input-driven, so re-querying is safe.
    #[error("reasoning endpoint failed after retry: {reason}")]
    ReasoningEndpoint { reason: String },

    /// The audit sink could not persist an entry.
    ///
    /// This is treated as fatal: a step that cannot be audited cannot proceed.
    #[error("audit write failed: {reason}")]
    AuditWrite { reason: String },

    /// An existing audit log failed chain verification while being reopened.
    #[error("audit chain corrupt: {reason}")]
    AuditCorrupt { reason: String },

    /// The audit storage itself failed while being read back.
    ///
    /// Distinct from [`ActaError::AuditCorrupt`]: the bytes could not be
    /// read or decoded at all, which says nothing about chain integrity.
    #[error("audit storage error: {reason}")]
    AuditStorage { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

/// Convenience alias used throughout the ACTA crates.
pub type ActaResult<T> = Result<T, ActaError>;

/// A single failed call to the reasoning endpoint.
///
/// Transient by definition: the orchestrator retries the step once before
/// escalating to [`ActaError::ReasoningEndpoint`].
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The per-call deadline expired before a response arrived.
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The endpoint answered 2xx but the body was empty or undecodable.
    #[error("malformed endpoint response: {reason}")]
    MalformedResponse { reason: String },

    /// The request never completed at the transport level.
    #[error("transport error: {reason}")]
    Transport { reason: String },
}

/// Why a free-text model response could not be turned into an [`Action`].
///
/// Parse errors are recoverable: the orchestrator feeds them back to the
/// model as failure observations and the loop continues.
///
/// [`Action`]: crate::action::Action
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// An `ACTION:` marker was present but named no tool.
    #[error("ACTION marker is present but names no tool")]
    MissingToolName,

    /// An `ACTION:` line had no `ACTION_INPUT:` block after it.
    #[error("ACTION '{tool}' has no ACTION_INPUT block")]
    MissingInput { tool: String },

    /// The `ACTION_INPUT:` block was not valid JSON.
    #[error("ACTION_INPUT for '{tool}' is not valid JSON: {detail}")]
    InvalidInput { tool: String, detail: String },
}

/// A failure raised by a registered tool handler.
///
/// Never escapes the registry: `execute` converts it into a failure
/// observation naming the tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The input was rejected before the handler did any work.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The handler started work and failed partway through.
    #[error("execution failed: {reason}")]
    Execution { reason: String },
}
