//! Scenario 2: Unknown Tool Recovery
//!
//! The model asks for a tool that was never registered. The registry refuses
//! the dispatch, the refusal is audited and fed back as a failure
//! observation, and the model recovers with a tool it actually has. Nothing
//! about a bad tool name is fatal; the loop absorbs it and keeps going.
//!
//! Loop walk-through for the demo run:
//!   1. Step 0: model calls fraud_detector; no such handler → UNKNOWN_TOOL
//!      failure observation, audited as a TOOL_RESULT
//!   2. Step 1: model reads the failure in its prompt and falls back to
//!      policy_lookup
//!   3. Step 2: model declares FINAL_ANSWER

use std::sync::Arc;

use acta_audit::MemoryAuditLog;
use acta_contracts::{error::ActaResult, observation::Observation, run::RunOutcome};
use acta_core::{traits::AuditSink, Orchestrator, OrchestratorConfig, ToolRegistry};
use acta_llm::ScriptedClient;
use acta_parser::marker::MarkerParser;
use acta_tools::{PolicyLookup, PolicyStore};

use crate::ledger::ledger_extractor;
use crate::scenarios::expense_audit::FINANCE_POLICY;

pub const OBJECTIVE: &str =
    "Screen last quarter's spending for fraud signals and summarize the exposure.";

/// The canned transcript: one bad tool name, then recovery.
pub fn scripted_responses() -> Vec<String> {
    vec![
        "THOUGHT: A dedicated fraud scanner would be ideal here.\n\
         ACTION: fraud_detector\n\
         ACTION_INPUT: {\"window_days\": 90}"
            .to_string(),
        "THOUGHT: No such tool exists. The policy advisory is the next best signal.\n\
         ACTION: policy_lookup\n\
         ACTION_INPUT: \"CAPEX\""
            .to_string(),
        "FINAL_ANSWER: \"No fraud tooling is available; flagged capital expenses for Level 3 review instead.\""
            .to_string(),
    ]
}

/// Wire the loop with the extraction and policy tools only; fraud_detector
/// is deliberately absent.
pub fn build_orchestrator(audit: Arc<dyn AuditSink>) -> ActaResult<Orchestrator> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ledger_extractor()?));
    registry.register(Box::new(PolicyLookup::new(PolicyStore::from_toml_str(
        FINANCE_POLICY,
    )?)));

    Orchestrator::new(
        OrchestratorConfig::default(),
        Box::new(ScriptedClient::new(scripted_responses())),
        Box::new(MarkerParser::new()),
        registry,
        audit,
    )
}

// ── Scenario runner ───────────────────────────────────────────────────────────

/// Run Scenario 2 with an in-memory audit log.
pub fn run_scenario() -> ActaResult<()> {
    println!("=== Scenario 2: Unknown Tool Recovery ===");
    println!();
    println!("  Objective: {}", OBJECTIVE);
    println!("  Registered tools: sql_extractor, policy_lookup");
    println!("  Requested tool:   fraud_detector (not registered)");
    println!();

    let audit = Arc::new(MemoryAuditLog::default());
    let mut orchestrator = build_orchestrator(audit.clone())?;

    let outcome = orchestrator.run(OBJECTIVE)?;

    let failed_step = orchestrator
        .history()
        .iter()
        .find(|step| step.observation.as_ref().is_some_and(Observation::is_failure));
    match failed_step {
        Some(step) => println!(
            "  Step {} was refused and fed back as a failure observation.",
            step.step_id
        ),
        None => println!("  UNEXPECTED: no failure observation recorded."),
    }

    match &outcome {
        RunOutcome::FinalAnswer { answer } => {
            println!("  Final answer: {}", answer);
        }
        RunOutcome::BudgetExhausted { steps_taken } => {
            println!("  UNEXPECTED: budget exhausted after {} steps", steps_taken);
        }
    }

    let export = audit.export();
    println!(
        "  Audit chain integrity: {} ({} entries)",
        if audit.verify()? { "VERIFIED" } else { "FAILED" },
        export.entries.len()
    );
    println!();
    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
