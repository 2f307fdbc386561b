//! Tool dispatch: name → handler, with every failure absorbed.
//!
//! `execute` is total. Whatever the model asks for — a tool that does not
//! exist, input that violates the tool's schema, a handler that fails
//! partway — the registry answers with a structured [`Observation`] that
//! feeds back into the reasoning loop. Nothing here panics or returns an
//! error to the orchestrator.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use acta_contracts::observation::{FailureKind, Observation};

use crate::traits::Tool;

/// What the prompt builder needs to advertise one tool to the model.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// The declared input schema, when the tool has one.
    pub input_schema: Option<serde_json::Value>,
}

/// Maps tool identifiers to handlers and dispatches single invocations.
///
/// A `BTreeMap` keeps the tool listing in a stable order, so the prompt the
/// model sees is reproducible run to run.
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool under its own name. Re-registering a name replaces
    /// the previous handler.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        debug!(tool = %name, "registering tool");
        self.tools.insert(name, tool);
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Specs for every registered tool, in stable name order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .values()
            .map(|tool| ToolSpec {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }

    /// Dispatch one invocation.
    ///
    /// # Outcomes
    ///
    /// - unknown `name` → failure observation of kind `UNKNOWN_TOOL`
    /// - input rejected by the tool's declared schema → failure observation
    ///   of kind `TOOL_EXECUTION_FAILURE`, handler never invoked
    /// - handler returns `Err` → failure observation of kind
    ///   `TOOL_EXECUTION_FAILURE` naming the handler
    /// - handler returns `Ok(records)` → success observation
    pub fn execute(&self, name: &str, input: &serde_json::Value) -> Observation {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = %name, "unknown tool requested");
            return Observation::failure(
                FailureKind::UnknownTool,
                Some(name),
                format!("no tool registered under '{}'", name),
            );
        };

        // ── Structural validation of model-supplied input ────────────────────
        //
        // The input came out of free text; check it against the tool's schema
        // before any handler logic runs.
        if let Some(schema) = tool.input_schema() {
            match jsonschema::validator_for(&schema) {
                Ok(validator) => {
                    let violations: Vec<String> = validator
                        .iter_errors(input)
                        .map(|error| format!("{} at {}", error, error.instance_path))
                        .collect();
                    if !violations.is_empty() {
                        warn!(tool = %name, violations = %violations.join("; "), "tool input rejected by schema");
                        return Observation::failure(
                            FailureKind::ToolExecutionFailure,
                            Some(name),
                            format!("input rejected by schema: {}", violations.join("; ")),
                        );
                    }
                }
                Err(e) => {
                    // A malformed schema is a configuration bug in the tool,
                    // surfaced as an execution failure rather than a panic.
                    warn!(tool = %name, error = %e, "tool declares an unparseable input schema");
                    return Observation::failure(
                        FailureKind::ToolExecutionFailure,
                        Some(name),
                        format!("tool input schema is invalid: {}", e),
                    );
                }
            }
        }

        // ── Handler invocation ────────────────────────────────────────────────
        match tool.invoke(input) {
            Ok(records) => {
                debug!(tool = %name, records = records.len(), "tool succeeded");
                Observation::success(records)
            }
            Err(err) => {
                warn!(tool = %name, error = %err, "tool failed");
                Observation::failure(FailureKind::ToolExecutionFailure, Some(name), err.to_string())
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
