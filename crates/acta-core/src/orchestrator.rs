//! The ACTA orchestrator: the budgeted think → parse → act → observe loop.
//!
//! The audit invariant is absolute: every transition writes at least one
//! entry through the `AuditSink` BEFORE the loop proceeds, and an entry that
//! cannot be written ends the run. The loop never outlives its budget:
//! strictly after `max_steps` iterations without a final answer, the run
//! terminates with `RunOutcome::BudgetExhausted`.
//!
//! Recoverable trouble (unknown tools, handler failures, unparseable model
//! output) is absorbed into the loop as failure observations the model sees
//! on its next turn. Only two things are fatal: an audit write failure and a
//! reasoning endpoint that fails twice for the same step.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use acta_contracts::{
    action::Action,
    audit::EventType,
    error::{ActaError, ActaResult, EndpointError},
    observation::{FailureKind, Observation},
    run::{RunId, RunOutcome, RunState, Step},
};

use crate::{
    prompt::PromptBuilder,
    registry::ToolRegistry,
    traits::{ActionParser, AuditSink, ReasoningClient},
};

/// Per-instance loop configuration.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Hard iteration budget. Must be greater than zero.
    pub max_steps: u64,
    /// Optional prompt truncation: render only the most recent N history
    /// steps. `None` renders everything.
    pub history_window: Option<usize>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_steps: 10,
            history_window: None,
        }
    }
}

/// The central loop driver.
///
/// Owns the conversation history and the step counter for the lifetime of a
/// run. The audit sink is shared (several concurrent runs may write to one
/// log); the client, parser, and registry are exclusive to this instance.
pub struct Orchestrator {
    config: OrchestratorConfig,
    client: Box<dyn ReasoningClient>,
    parser: Box<dyn ActionParser>,
    registry: ToolRegistry,
    audit: Arc<dyn AuditSink>,
    prompt: PromptBuilder,
    history: Vec<Step>,
    state: RunState,
}

impl Orchestrator {
    /// Create an orchestrator, validating the configuration.
    pub fn new(
        config: OrchestratorConfig,
        client: Box<dyn ReasoningClient>,
        parser: Box<dyn ActionParser>,
        registry: ToolRegistry,
        audit: Arc<dyn AuditSink>,
    ) -> ActaResult<Self> {
        if config.max_steps == 0 {
            return Err(ActaError::Config {
                reason: "max_steps must be greater than zero".to_string(),
            });
        }
        let prompt = PromptBuilder::new(config.history_window);
        Ok(Self {
            config,
            client,
            parser,
            registry,
            audit,
            prompt,
            history: Vec::new(),
            state: RunState::Running,
        })
    }

    /// The state of the most recent run (Running while one is in flight).
    pub fn state(&self) -> RunState {
        self.state
    }

    /// The steps accumulated by the most recent run.
    pub fn history(&self) -> &[Step] {
        &self.history
    }

    /// Pursue `objective` until a final answer or budget exhaustion.
    ///
    /// # Loop
    ///
    /// 1. Log `INIT` at `step_id = 0` before the first iteration
    /// 2. Per iteration: build the prompt from objective + history, call the
    ///    endpoint (one retry on failure, then abort as FAILED), log the raw
    ///    response as `LLM_RAW`
    /// 3. Parse the response:
    ///    - `FINAL_ANSWER` → log `FINAL`, return the payload — terminal
    ///    - `TOOL_CALL` → dispatch through the registry, log `TOOL_RESULT`
    ///      (success or failure payload), append the Step
    ///    - `CONTINUE` → append a Step with empty observation
    ///    - parse failure → log `ERROR`, append a Step whose observation is
    ///      the structured failure; the model sees it next turn
    /// 4. After `max_steps` iterations: log a `FINAL` entry marking
    ///    `BUDGET_EXHAUSTED` at `step_id = max_steps` and return
    ///    `RunOutcome::BudgetExhausted`
    ///
    /// # Errors
    ///
    /// `InvalidObjective` for an empty objective (nothing is logged),
    /// `ReasoningEndpoint` after a failed retry, `AuditWrite` when an entry
    /// cannot be committed. Unknown tools, handler failures, and malformed
    /// model output are NOT errors — they feed back into the loop.
    pub fn run(&mut self, objective: &str) -> ActaResult<RunOutcome> {
        if objective.trim().is_empty() {
            return Err(ActaError::InvalidObjective {
                reason: "objective must not be empty".to_string(),
            });
        }

        self.history.clear();
        self.state = RunState::Running;
        let run_id = RunId::new();

        let outcome = self.drive(&run_id, objective);
        if outcome.is_err() {
            self.state = RunState::Failed;
        }
        outcome
    }

    fn drive(&mut self, run_id: &RunId, objective: &str) -> ActaResult<RunOutcome> {
        info!(
            run_id = %run_id.0,
            max_steps = self.config.max_steps,
            %objective,
            "run starting"
        );

        // ── INIT: on record before any reasoning happens ──────────────────────
        self.audit
            .append(run_id, 0, EventType::Init, json!({ "objective": objective }))?;

        let system_prompt = self.prompt.system(&self.registry.specs());

        for step_id in 0..self.config.max_steps {
            // ── Think ─────────────────────────────────────────────────────────
            let user_prompt = self.prompt.user(objective, &self.history);
            let raw = self.think(run_id, step_id, &system_prompt, &user_prompt)?;
            self.audit
                .append(run_id, step_id, EventType::LlmRaw, json!({ "response": &raw }))?;

            // ── Parse, act, observe ───────────────────────────────────────────
            let (action, observation) = match self.parser.parse(&raw) {
                Ok(Action::FinalAnswer { answer }) => {
                    self.audit.append(
                        run_id,
                        step_id,
                        EventType::Final,
                        json!({ "outcome": "FINAL_ANSWER", "answer": &answer }),
                    )?;
                    self.state = RunState::Finalized;
                    info!(run_id = %run_id.0, step = step_id, "run finalized with an answer");
                    return Ok(RunOutcome::FinalAnswer { answer });
                }

                Ok(Action::ToolCall { tool, input }) => {
                    debug!(run_id = %run_id.0, step = step_id, tool = %tool, "dispatching tool call");
                    let observation = self.registry.execute(&tool, &input);
                    self.audit.append(
                        run_id,
                        step_id,
                        EventType::ToolResult,
                        json!({ "tool": &tool, "observation": &observation }),
                    )?;
                    (Some(Action::ToolCall { tool, input }), Some(observation))
                }

                Ok(Action::Continue) => {
                    debug!(run_id = %run_id.0, step = step_id, "pure reasoning step");
                    (Some(Action::Continue), None)
                }

                Err(parse_err) => {
                    warn!(
                        run_id = %run_id.0,
                        step = step_id,
                        error = %parse_err,
                        "model output failed to parse"
                    );
                    self.audit.append(
                        run_id,
                        step_id,
                        EventType::Error,
                        json!({ "kind": "PARSE_FAILURE", "message": parse_err.to_string() }),
                    )?;
                    let failure =
                        Observation::failure(FailureKind::ParseFailure, None, parse_err.to_string());
                    (None, Some(failure))
                }
            };

            self.history.push(Step {
                step_id,
                raw_response: raw,
                action,
                observation,
                timestamp: Utc::now(),
            });
        }

        // ── Budget exhausted: a defined terminal outcome, not an error ────────
        self.audit.append(
            run_id,
            self.config.max_steps,
            EventType::Final,
            json!({ "outcome": "BUDGET_EXHAUSTED", "steps_taken": self.config.max_steps }),
        )?;
        self.state = RunState::Exhausted;
        warn!(
            run_id = %run_id.0,
            max_steps = self.config.max_steps,
            "step budget exhausted without a final answer"
        );
        Ok(RunOutcome::BudgetExhausted {
            steps_taken: self.config.max_steps,
        })
    }

    /// One think step: call the endpoint, retrying once on failure.
    ///
    /// Both failures are audited as ERROR entries at the failing step's id.
    /// An empty response body counts as a failure; the model must say
    /// something for the loop to act on.
    fn think(
        &self,
        run_id: &RunId,
        step_id: u64,
        system: &str,
        prompt: &str,
    ) -> ActaResult<String> {
        match self.ask(system, prompt) {
            Ok(raw) => Ok(raw),
            Err(first) => {
                warn!(
                    run_id = %run_id.0,
                    step = step_id,
                    error = %first,
                    "reasoning endpoint failed, retrying once"
                );
                self.audit_endpoint_failure(run_id, step_id, &first, true)?;

                match self.ask(system, prompt) {
                    Ok(raw) => {
                        info!(run_id = %run_id.0, step = step_id, "endpoint retry succeeded");
                        Ok(raw)
                    }
                    Err(second) => {
                        warn!(
                            run_id = %run_id.0,
                            step = step_id,
                            error = %second,
                            "endpoint retry failed, aborting run"
                        );
                        self.audit_endpoint_failure(run_id, step_id, &second, false)?;
                        Err(ActaError::ReasoningEndpoint {
                            reason: second.to_string(),
                        })
                    }
                }
            }
        }
    }

    fn ask(&self, system: &str, prompt: &str) -> Result<String, EndpointError> {
        let raw = self.client.complete(system, prompt)?;
        if raw.trim().is_empty() {
            return Err(EndpointError::MalformedResponse {
                reason: "endpoint returned an empty response".to_string(),
            });
        }
        Ok(raw)
    }

    fn audit_endpoint_failure(
        &self,
        run_id: &RunId,
        step_id: u64,
        err: &EndpointError,
        will_retry: bool,
    ) -> ActaResult<()> {
        self.audit
            .append(
                run_id,
                step_id,
                EventType::Error,
                json!({
                    "kind": "REASONING_ENDPOINT_FAILURE",
                    "message": err.to_string(),
                    "will_retry": will_retry,
                }),
            )
            .map(|_| ())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use acta_contracts::{
        action::Action,
        audit::{AuditEntry, EventType},
        error::{ActaError, ActaResult, EndpointError, ParseError, ToolError},
        observation::{FailureKind, Observation, Record},
        run::{RunId, RunOutcome, RunState},
    };
    use chrono::Utc;
    use serde_json::json;

    use crate::{
        registry::ToolRegistry,
        traits::{ActionParser, AuditSink, ReasoningClient, Tool},
    };

    use super::{Orchestrator, OrchestratorConfig};

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// Returns canned responses in order; the final response repeats forever.
    struct ScriptedClient {
        responses: Mutex<VecDeque<String>>,
    }

    impl ScriptedClient {
        fn new<I, S>(responses: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            }
        }
    }

    impl ReasoningClient for ScriptedClient {
        fn complete(&self, _system: &str, _prompt: &str) -> Result<String, EndpointError> {
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                Ok(responses.pop_front().unwrap())
            } else {
                responses
                    .front()
                    .cloned()
                    .ok_or_else(|| EndpointError::MalformedResponse {
                        reason: "script is empty".to_string(),
                    })
            }
        }
    }

    /// Fails the first `failures` calls, then answers with `response`.
    struct FlakyClient {
        failures: usize,
        calls: Arc<Mutex<usize>>,
        response: String,
    }

    impl FlakyClient {
        fn new(failures: usize, response: &str) -> Self {
            Self {
                failures,
                calls: Arc::new(Mutex::new(0)),
                response: response.to_string(),
            }
        }
    }

    impl ReasoningClient for FlakyClient {
        fn complete(&self, _system: &str, _prompt: &str) -> Result<String, EndpointError> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls <= self.failures {
                Err(EndpointError::Timeout { seconds: 1 })
            } else {
                Ok(self.response.clone())
            }
        }
    }

    /// Minimal marker parser for driving the loop in tests.
    struct StubParser;

    impl ActionParser for StubParser {
        fn parse(&self, raw: &str) -> Result<Action, ParseError> {
            if let Some(rest) = raw.strip_prefix("FINAL_ANSWER:") {
                let text = rest.trim();
                let answer = serde_json::from_str(text).unwrap_or_else(|_| json!(text));
                return Ok(Action::FinalAnswer { answer });
            }
            if raw.starts_with("GARBLED") {
                return Err(ParseError::MissingToolName);
            }
            if let Some(rest) = raw.strip_prefix("ACTION:") {
                let mut parts = rest.splitn(2, '\n');
                let tool = parts.next().unwrap_or("").trim().to_string();
                let input = parts
                    .next()
                    .and_then(|line| line.trim().strip_prefix("ACTION_INPUT:"))
                    .and_then(|body| serde_json::from_str(body.trim()).ok())
                    .unwrap_or_else(|| json!({}));
                return Ok(Action::ToolCall { tool, input });
            }
            Ok(Action::Continue)
        }
    }

    /// An audit sink that records every entry for later inspection.
    struct RecordingAudit {
        entries: Arc<Mutex<Vec<AuditEntry>>>,
    }

    impl RecordingAudit {
        fn new() -> Self {
            Self {
                entries: Arc::new(Mutex::new(vec![])),
            }
        }
    }

    impl AuditSink for RecordingAudit {
        fn append(
            &self,
            run_id: &RunId,
            step_id: u64,
            event_type: EventType,
            payload: serde_json::Value,
        ) -> ActaResult<AuditEntry> {
            let entry = AuditEntry {
                timestamp: Utc::now(),
                run_id: run_id.clone(),
                step_id,
                event_type,
                payload,
                prev_hash: "0".repeat(64),
            };
            self.entries.lock().unwrap().push(entry.clone());
            Ok(entry)
        }

        fn verify(&self) -> ActaResult<bool> {
            Ok(true)
        }
    }

    /// An audit sink whose writes always fail.
    struct FailingAudit;

    impl AuditSink for FailingAudit {
        fn append(
            &self,
            _run_id: &RunId,
            _step_id: u64,
            _event_type: EventType,
            _payload: serde_json::Value,
        ) -> ActaResult<AuditEntry> {
            Err(ActaError::AuditWrite {
                reason: "disk full".to_string(),
            })
        }

        fn verify(&self) -> ActaResult<bool> {
            Ok(true)
        }
    }

    /// A tool that echoes its input back as one record.
    struct EchoTool;

    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "echoes the input back"
        }

        fn invoke(&self, input: &serde_json::Value) -> Result<Vec<Record>, ToolError> {
            let mut record = Record::new();
            record.insert("echoed".to_string(), input.clone());
            Ok(vec![record])
        }
    }

    fn orchestrator_with(
        client: Box<dyn ReasoningClient>,
        audit: Arc<RecordingAudit>,
        max_steps: u64,
    ) -> Orchestrator {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        Orchestrator::new(
            OrchestratorConfig {
                max_steps,
                history_window: None,
            },
            client,
            Box::new(StubParser),
            registry,
            audit,
        )
        .unwrap()
    }

    fn count(entries: &[AuditEntry], event_type: EventType) -> usize {
        entries.iter().filter(|e| e.event_type == event_type).count()
    }

    // ── Test cases ────────────────────────────────────────────────────────────

    /// First response is a final answer: exactly one INIT, one LLM_RAW, one
    /// FINAL, and zero TOOL_RESULT entries.
    #[test]
    fn test_final_answer_on_first_response() {
        let audit = Arc::new(RecordingAudit::new());
        let entries = audit.entries.clone();

        let client = Box::new(ScriptedClient::new(["FINAL_ANSWER: \"done\""]));
        let mut orchestrator = orchestrator_with(client, audit, 10);

        let outcome = orchestrator.run("check the ledger").unwrap();
        assert_eq!(outcome, RunOutcome::FinalAnswer { answer: json!("done") });
        assert_eq!(orchestrator.state(), RunState::Finalized);

        let entries = entries.lock().unwrap();
        assert_eq!(count(&entries, EventType::Init), 1);
        assert_eq!(count(&entries, EventType::LlmRaw), 1);
        assert_eq!(count(&entries, EventType::Final), 1);
        assert_eq!(count(&entries, EventType::ToolResult), 0);

        // INIT is the very first entry, at step 0.
        assert_eq!(entries[0].event_type, EventType::Init);
        assert_eq!(entries[0].step_id, 0);
    }

    /// An always-CONTINUE endpoint exhausts the budget after exactly
    /// max_steps logged iterations.
    #[test]
    fn test_budget_exhausted_after_exactly_max_steps() {
        let audit = Arc::new(RecordingAudit::new());
        let entries = audit.entries.clone();

        let client = Box::new(ScriptedClient::new(["thinking about it some more..."]));
        let mut orchestrator = orchestrator_with(client, audit, 10);

        let outcome = orchestrator.run("never finishes").unwrap();
        assert_eq!(outcome, RunOutcome::BudgetExhausted { steps_taken: 10 });
        assert_eq!(orchestrator.state(), RunState::Exhausted);
        assert_eq!(orchestrator.history().len(), 10);

        let entries = entries.lock().unwrap();
        assert_eq!(count(&entries, EventType::LlmRaw), 10, "one LLM_RAW per iteration");
        assert_eq!(count(&entries, EventType::Final), 1, "exhaustion is recorded as FINAL");

        let final_entry = entries.last().unwrap();
        assert_eq!(final_entry.payload["outcome"], json!("BUDGET_EXHAUSTED"));
        assert_eq!(final_entry.step_id, 10);
    }

    /// Step ids observed in the log are exactly 0..=k with no gaps or repeats.
    #[test]
    fn test_step_ids_are_gapless() {
        let audit = Arc::new(RecordingAudit::new());
        let entries = audit.entries.clone();

        let client = Box::new(ScriptedClient::new([
            "let me look at the data",
            "ACTION: echo\nACTION_INPUT: {\"n\": 1}",
            "FINAL_ANSWER: \"ok\"",
        ]));
        let mut orchestrator = orchestrator_with(client, audit, 10);
        orchestrator.run("objective").unwrap();

        let entries = entries.lock().unwrap();
        let mut observed: Vec<u64> = entries.iter().map(|e| e.step_id).collect();
        observed.sort_unstable();
        observed.dedup();
        assert_eq!(observed, vec![0, 1, 2]);
    }

    /// A tool call logs TOOL_RESULT and feeds the observation into history.
    #[test]
    fn test_tool_call_is_dispatched_and_logged() {
        let audit = Arc::new(RecordingAudit::new());
        let entries = audit.entries.clone();

        let client = Box::new(ScriptedClient::new([
            "ACTION: echo\nACTION_INPUT: {\"amount\": 7200}",
            "FINAL_ANSWER: \"reviewed\"",
        ]));
        let mut orchestrator = orchestrator_with(client, audit, 10);
        orchestrator.run("objective").unwrap();

        let entries = entries.lock().unwrap();
        assert_eq!(count(&entries, EventType::ToolResult), 1);

        let tool_entry = entries
            .iter()
            .find(|e| e.event_type == EventType::ToolResult)
            .unwrap();
        assert_eq!(tool_entry.payload["tool"], json!("echo"));
        assert_eq!(tool_entry.payload["observation"]["status"], json!("SUCCESS"));

        let step = &orchestrator.history()[0];
        assert!(matches!(step.action, Some(Action::ToolCall { .. })));
        assert!(matches!(step.observation, Some(Observation::Success { .. })));
    }

    /// An unknown tool name is absorbed as a failure observation; the run
    /// carries on and can still finalize.
    #[test]
    fn test_unknown_tool_is_absorbed() {
        let audit = Arc::new(RecordingAudit::new());
        let entries = audit.entries.clone();

        let client = Box::new(ScriptedClient::new([
            "ACTION: graph_db\nACTION_INPUT: {}",
            "FINAL_ANSWER: \"recovered\"",
        ]));
        let mut orchestrator = orchestrator_with(client, audit, 10);

        let outcome = orchestrator.run("objective").unwrap();
        assert_eq!(outcome, RunOutcome::FinalAnswer { answer: json!("recovered") });

        let entries = entries.lock().unwrap();
        let tool_entry = entries
            .iter()
            .find(|e| e.event_type == EventType::ToolResult)
            .unwrap();
        assert_eq!(tool_entry.payload["observation"]["kind"], json!("UNKNOWN_TOOL"));

        match &orchestrator.history()[0].observation {
            Some(Observation::Failure(failure)) => {
                assert_eq!(failure.kind, FailureKind::UnknownTool);
            }
            other => panic!("expected failure observation, got {:?}", other),
        }
    }

    /// Unparseable output is logged as ERROR and fed back as an observation;
    /// the step records no action.
    #[test]
    fn test_parse_failure_feeds_back_as_observation() {
        let audit = Arc::new(RecordingAudit::new());
        let entries = audit.entries.clone();

        let client = Box::new(ScriptedClient::new(["GARBLED", "FINAL_ANSWER: \"ok\""]));
        let mut orchestrator = orchestrator_with(client, audit, 10);

        let outcome = orchestrator.run("objective").unwrap();
        assert_eq!(outcome, RunOutcome::FinalAnswer { answer: json!("ok") });

        let entries = entries.lock().unwrap();
        let error_entry = entries
            .iter()
            .find(|e| e.event_type == EventType::Error)
            .unwrap();
        assert_eq!(error_entry.payload["kind"], json!("PARSE_FAILURE"));

        let step = &orchestrator.history()[0];
        assert!(step.action.is_none(), "a step that failed to parse has no action");
        match &step.observation {
            Some(Observation::Failure(failure)) => {
                assert_eq!(failure.kind, FailureKind::ParseFailure);
            }
            other => panic!("expected failure observation, got {:?}", other),
        }
    }

    /// One endpoint failure is retried within the same step and audited.
    #[test]
    fn test_endpoint_failure_retried_once() {
        let audit = Arc::new(RecordingAudit::new());
        let entries = audit.entries.clone();

        let client = Box::new(FlakyClient::new(1, "FINAL_ANSWER: \"made it\""));
        let mut orchestrator = orchestrator_with(client, audit, 10);

        let outcome = orchestrator.run("objective").unwrap();
        assert_eq!(outcome, RunOutcome::FinalAnswer { answer: json!("made it") });
        assert_eq!(orchestrator.state(), RunState::Finalized);

        let entries = entries.lock().unwrap();
        assert_eq!(count(&entries, EventType::Error), 1);

        let error_entry = entries
            .iter()
            .find(|e| e.event_type == EventType::Error)
            .unwrap();
        assert_eq!(error_entry.payload["kind"], json!("REASONING_ENDPOINT_FAILURE"));
        assert_eq!(error_entry.payload["will_retry"], json!(true));
        assert_eq!(error_entry.step_id, 0, "retry happens within the same step");
    }

    /// A second consecutive endpoint failure aborts the run as FAILED with
    /// two ERROR entries on record.
    #[test]
    fn test_endpoint_retry_exhausted_fails_run() {
        let audit = Arc::new(RecordingAudit::new());
        let entries = audit.entries.clone();

        let client = Box::new(FlakyClient::new(usize::MAX, "never"));
        let mut orchestrator = orchestrator_with(client, audit, 10);

        let result = orchestrator.run("objective");
        match result {
            Err(ActaError::ReasoningEndpoint { reason }) => {
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected ReasoningEndpoint error, got {:?}", other),
        }
        assert_eq!(orchestrator.state(), RunState::Failed);

        let entries = entries.lock().unwrap();
        assert_eq!(count(&entries, EventType::Error), 2);
        assert_eq!(count(&entries, EventType::LlmRaw), 0);
        assert_eq!(count(&entries, EventType::Final), 0);
    }

    /// An empty endpoint response counts as an endpoint failure, not a parse
    /// failure.
    #[test]
    fn test_empty_response_is_endpoint_failure() {
        let audit = Arc::new(RecordingAudit::new());

        let client = Box::new(ScriptedClient::new([""]));
        let mut orchestrator = orchestrator_with(client, audit, 10);

        let result = orchestrator.run("objective");
        assert!(matches!(result, Err(ActaError::ReasoningEndpoint { .. })));
        assert_eq!(orchestrator.state(), RunState::Failed);
    }

    /// An audit write failure is fatal, even though the endpoint and parser
    /// are perfectly healthy.
    #[test]
    fn test_audit_write_failure_is_fatal() {
        let client = Box::new(ScriptedClient::new(["FINAL_ANSWER: \"done\""]));
        let mut orchestrator = Orchestrator::new(
            OrchestratorConfig::default(),
            client,
            Box::new(StubParser),
            ToolRegistry::new(),
            Arc::new(FailingAudit),
        )
        .unwrap();

        let result = orchestrator.run("objective");
        assert!(matches!(result, Err(ActaError::AuditWrite { .. })));
        assert_eq!(orchestrator.state(), RunState::Failed);
    }

    /// An empty objective is rejected before anything is logged.
    #[test]
    fn test_empty_objective_rejected() {
        let audit = Arc::new(RecordingAudit::new());
        let entries = audit.entries.clone();

        let client = Box::new(ScriptedClient::new(["FINAL_ANSWER: \"done\""]));
        let mut orchestrator = orchestrator_with(client, audit, 10);

        let result = orchestrator.run("   ");
        assert!(matches!(result, Err(ActaError::InvalidObjective { .. })));
        assert!(entries.lock().unwrap().is_empty(), "nothing may be logged for a rejected run");
    }

    /// A zero step budget is a configuration error at construction time.
    #[test]
    fn test_zero_max_steps_rejected_at_construction() {
        let result = Orchestrator::new(
            OrchestratorConfig {
                max_steps: 0,
                history_window: None,
            },
            Box::new(ScriptedClient::new(["x"])),
            Box::new(StubParser),
            ToolRegistry::new(),
            Arc::new(RecordingAudit::new()),
        );
        assert!(matches!(result, Err(ActaError::Config { .. })));
    }

    /// Pure reasoning steps carry no observation.
    #[test]
    fn test_continue_steps_have_empty_observation() {
        let audit = Arc::new(RecordingAudit::new());

        let client = Box::new(ScriptedClient::new([
            "hmm, the ledger first",
            "FINAL_ANSWER: \"ok\"",
        ]));
        let mut orchestrator = orchestrator_with(client, audit, 10);
        orchestrator.run("objective").unwrap();

        let step = &orchestrator.history()[0];
        assert_eq!(step.action, Some(Action::Continue));
        assert!(step.observation.is_none());
    }
}
