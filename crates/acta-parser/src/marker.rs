//! The marker grammar: how raw model text becomes an [`Action`].
//!
//! Markers are case-sensitive and line-anchored. A marker that appears in
//! the middle of a sentence is just prose. Text with no marker at all is a
//! continuation, not an error, because models routinely emit a paragraph of
//! reasoning before committing to an action.

use serde_json::Value;
use tracing::debug;

use acta_contracts::{action::Action, error::ParseError};
use acta_core::traits::ActionParser;

/// Terminates the run. Everything after the marker is the answer: parsed
/// as JSON when it is valid JSON, kept as a raw string otherwise.
pub const FINAL_ANSWER_MARKER: &str = "FINAL_ANSWER:";

/// Names the tool to invoke. The rest of the marker's line is the tool name.
pub const ACTION_MARKER: &str = "ACTION:";

/// Carries the tool input. The first complete JSON value after the marker
/// is taken, so inputs may span multiple lines; trailing commentary after
/// the value is ignored.
pub const ACTION_INPUT_MARKER: &str = "ACTION_INPUT:";

/// Byte offset just past the first line-anchored occurrence of `marker`.
/// Leading whitespace on the line is tolerated.
fn after_marker(text: &str, marker: &str) -> Option<usize> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with(marker) {
            let indent = line.len() - trimmed.len();
            return Some(offset + indent + marker.len());
        }
        offset += line.len();
    }
    None
}

/// Parses the three-marker grammar out of otherwise free-form model text.
///
/// `FINAL_ANSWER:` always wins: once a response declares an answer, any
/// action markers around it are ignored. An `ACTION:` line must be followed
/// by an `ACTION_INPUT:` line; input above the action line belongs to
/// earlier prose and is not picked up.
#[derive(Debug, Default)]
pub struct MarkerParser;

impl MarkerParser {
    pub fn new() -> Self {
        Self
    }
}

impl ActionParser for MarkerParser {
    fn parse(&self, raw_text: &str) -> Result<Action, ParseError> {
        if let Some(after) = after_marker(raw_text, FINAL_ANSWER_MARKER) {
            let tail = raw_text[after..].trim();
            let answer = serde_json::from_str(tail).unwrap_or_else(|_| {
                debug!("final answer payload is not JSON, keeping raw string");
                Value::String(tail.to_string())
            });
            return Ok(Action::FinalAnswer { answer });
        }

        let Some(after) = after_marker(raw_text, ACTION_MARKER) else {
            return Ok(Action::Continue);
        };
        let tail = &raw_text[after..];

        let tool = tail.lines().next().unwrap_or("").trim();
        if tool.is_empty() {
            return Err(ParseError::MissingToolName);
        }

        let Some(input_after) = after_marker(tail, ACTION_INPUT_MARKER) else {
            return Err(ParseError::MissingInput {
                tool: tool.to_string(),
            });
        };
        let input_text = tail[input_after..].trim();
        let mut values = serde_json::Deserializer::from_str(input_text).into_iter::<Value>();
        let input = match values.next() {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                return Err(ParseError::InvalidInput {
                    tool: tool.to_string(),
                    detail: e.to_string(),
                })
            }
            None => {
                return Err(ParseError::InvalidInput {
                    tool: tool.to_string(),
                    detail: "input is empty".to_string(),
                })
            }
        };

        Ok(Action::ToolCall {
            tool: tool.to_string(),
            input,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
