//! The structured decision parsed out of a model's free-text response.

use serde::{Deserialize, Serialize};

/// What the reasoning model decided to do this step.
///
/// Exactly one variant is active per parsed response. The serialized form is
/// internally tagged so audit payloads read naturally, e.g.
/// `{"action":"TOOL_CALL","tool":"sql_extractor","input":{...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// No marker found: the response is pure reasoning, loop again.
    Continue,

    /// Invoke a named tool with structured JSON input.
    ToolCall {
        /// Registry identifier of the tool (e.g. "sql_extractor").
        tool: String,
        /// Model-supplied input, validated at the dispatch boundary.
        input: serde_json::Value,
    },

    /// Terminate the run and return the payload to the caller.
    FinalAnswer {
        /// The answer body: JSON when the model produced valid JSON after
        /// the marker, otherwise the raw text as a JSON string.
        answer: serde_json::Value,
    },
}

impl Action {
    /// True when this action ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::FinalAnswer { .. })
    }
}
