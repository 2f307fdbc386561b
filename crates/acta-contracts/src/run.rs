//! Run identity, loop state, and per-iteration records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{action::Action, observation::Observation};

/// Unique identifier for a single `run()` invocation.
///
/// Several runs may share one audit log; this id scopes their `step_id`
/// sequences and appears in every audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    /// Create a new, unique run ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// The orchestrator's state machine.
///
/// `Running` is the only state with outgoing transitions; the other three
/// are terminal. Observable through `Orchestrator::state()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// The loop is mid-flight (also the initial state of a fresh run).
    Running,
    /// The model produced a final answer inside the budget.
    Finalized,
    /// The step budget ran out before a final answer.
    Exhausted,
    /// An unrecoverable endpoint or audit failure ended the run.
    Failed,
}

impl RunState {
    /// True for the three states with no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunState::Running)
    }
}

/// What `run()` hands back on the non-error path.
///
/// Callers pattern-match on this:
/// - `FinalAnswer` → the model finished; use `answer`
/// - `BudgetExhausted` → defined terminal outcome, distinct from success,
///   never silently swallowed
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The model emitted a `FINAL_ANSWER` inside the step budget.
    FinalAnswer { answer: serde_json::Value },
    /// `max_steps` iterations elapsed without a final answer.
    BudgetExhausted { steps_taken: u64 },
}

/// One iteration of the loop, immutable once appended to the history.
///
/// The history is owned exclusively by the orchestrator for the lifetime of
/// one run and is never persisted except through the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Zero-based iteration counter; never reused within a run.
    pub step_id: u64,
    /// The model's raw free-text response for this iteration.
    pub raw_response: String,
    /// The parsed action, or `None` when the raw text failed to parse.
    pub action: Option<Action>,
    /// What acting produced: tool output, a structured failure, or `None`
    /// for a pure reasoning step.
    pub observation: Option<Observation>,
    /// Wall-clock time the step was created (UTC).
    pub timestamp: DateTime<Utc>,
}
