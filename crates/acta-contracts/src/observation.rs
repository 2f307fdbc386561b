//! Tool execution results fed back into the reasoning loop.
//!
//! An [`Observation`] is the only thing a tool call can produce: either a
//! sequence of key-value records or a structured failure. Failures here are
//! normal loop traffic, not errors; the model is expected to read them and
//! adapt on its next turn.

use serde::{Deserialize, Serialize};

/// One row of structured tool output.
///
/// `serde_json::Map` keeps keys sorted, so records serialize identically
/// every time they pass through the audit chain.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Classifies a failure observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The requested tool name is not registered.
    UnknownTool,
    /// The model's free-text response could not be parsed into an action.
    ParseFailure,
    /// A registered handler rejected its input or failed while running.
    ToolExecutionFailure,
}

/// The failure half of an [`Observation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationFailure {
    /// What class of failure this is.
    pub kind: FailureKind,
    /// The tool involved, when one was named (the unknown name for
    /// [`FailureKind::UnknownTool`], the handler for execution failures).
    pub tool: Option<String>,
    /// Human-readable detail, written for the model to read.
    pub message: String,
}

/// The result of executing one `TOOL_CALL` action. Never both halves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Observation {
    /// The tool ran and produced zero or more records.
    Success { records: Vec<Record> },
    /// The call failed in a structured, recoverable way.
    Failure(ObservationFailure),
}

impl Observation {
    /// Build a success observation from tool records.
    pub fn success(records: Vec<Record>) -> Self {
        Observation::Success { records }
    }

    /// Build a failure observation.
    pub fn failure(kind: FailureKind, tool: Option<&str>, message: impl Into<String>) -> Self {
        Observation::Failure(ObservationFailure {
            kind,
            tool: tool.map(str::to_string),
            message: message.into(),
        })
    }

    /// True when this observation is the failure half.
    pub fn is_failure(&self) -> bool {
        matches!(self, Observation::Failure(_))
    }
}
