//! Prompt assembly for the reasoning endpoint.
//!
//! The request the endpoint sees is objective + tool specifications +
//! serialized history. The grammar the system prompt teaches (`ACTION:` /
//! `ACTION_INPUT:` / `FINAL_ANSWER:`) is the same grammar the parser
//! recognizes, so the loop is self-consistent end to end.

use acta_contracts::run::Step;

use crate::registry::ToolSpec;

/// Builds the system and user prompts for each think step.
pub struct PromptBuilder {
    /// When set, only the most recent N history steps are rendered.
    /// `None` renders the full history (already bounded by the step budget).
    history_window: Option<usize>,
}

impl PromptBuilder {
    pub fn new(history_window: Option<usize>) -> Self {
        Self { history_window }
    }

    /// The static instruction block: role, tool listing, response grammar.
    pub fn system(&self, specs: &[ToolSpec]) -> String {
        let mut out = String::new();
        out.push_str(
            "You are a compliance analysis agent. You pursue the OBJECTIVE step by step \
             and may invoke tools.\n\n",
        );

        if specs.is_empty() {
            out.push_str("No tools are available.\n");
        } else {
            out.push_str("Available tools:\n");
            for spec in specs {
                out.push_str(&format!("- {}: {}\n", spec.name, spec.description));
                if let Some(schema) = &spec.input_schema {
                    out.push_str(&format!("  input schema: {}\n", schema));
                }
            }
        }

        out.push_str("\nRespond with exactly one of:\n\n");
        out.push_str("1. A tool invocation:\nACTION: <tool name>\nACTION_INPUT: <JSON input>\n\n");
        out.push_str("2. A final answer:\nFINAL_ANSWER: <answer>\n\n");
        out.push_str("Anything else is treated as intermediate reasoning and the loop continues.\n");
        out
    }

    /// The per-step block: objective plus the rendered history window.
    pub fn user(&self, objective: &str, history: &[Step]) -> String {
        let mut out = format!("OBJECTIVE: {}\n", objective);

        let window = match self.history_window {
            Some(n) => &history[history.len().saturating_sub(n)..],
            None => history,
        };

        if window.is_empty() {
            out.push_str("\nNo steps taken yet.\n");
        } else {
            if window.len() < history.len() {
                out.push_str(&format!(
                    "\n(earlier steps omitted; showing the most recent {})\n",
                    window.len()
                ));
            }
            for step in window {
                out.push_str(&format!("\nSTEP {}:\n", step.step_id));
                out.push_str(&format!("RESPONSE: {}\n", step.raw_response));
                match &step.observation {
                    Some(observation) => {
                        let rendered = serde_json::to_string(observation)
                            .unwrap_or_else(|_| "(unrenderable observation)".to_string());
                        out.push_str(&format!("OBSERVATION: {}\n", rendered));
                    }
                    None => out.push_str("OBSERVATION: (none)\n"),
                }
            }
        }

        out.push_str("\nNext response:\n");
        out
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
