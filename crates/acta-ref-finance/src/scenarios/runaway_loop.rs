//! Scenario 3: Runaway Loop Containment
//!
//! The model never commits to an action: every response is another round of
//! musing with no marker in it. Each one is a legal continuation, so the
//! loop cannot fail its way out; the step budget is what brings the run to
//! a defined end.
//!
//! Loop walk-through for the demo run:
//!   1. Steps 0 through 9: the same marker-free response, each audited as
//!      LLM_RAW and fed back into a growing history
//!   2. After step 9 the budget is spent: one FINAL entry records
//!      BUDGET_EXHAUSTED and the run ends as a defined outcome, not an error

use std::sync::Arc;

use acta_audit::MemoryAuditLog;
use acta_contracts::{error::ActaResult, run::RunOutcome};
use acta_core::{traits::AuditSink, Orchestrator, OrchestratorConfig, ToolRegistry};
use acta_llm::ScriptedClient;
use acta_parser::marker::MarkerParser;
use acta_tools::{PolicyLookup, PolicyStore};

use crate::ledger::ledger_extractor;
use crate::scenarios::expense_audit::FINANCE_POLICY;

pub const OBJECTIVE: &str = "Decide whether the quarter's spending pattern is anomalous.";

/// One marker-free response; the scripted client repeats it forever.
pub fn scripted_responses() -> Vec<String> {
    vec![
        "THOUGHT: Something still feels off about these numbers. Let me keep thinking."
            .to_string(),
    ]
}

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

/// Run Scenario 3 with an in-memory audit log.
pub fn run_scenario() -> ActaResult<()> {
    println!("=== Scenario 3: Runaway Loop Containment ===");
    println!();
    println!("  Objective: {}", OBJECTIVE);
    println!("  Model behavior: never emits a marker (pure musing, forever)");
    println!();

    let audit = Arc::new(MemoryAuditLog::default());
    let mut orchestrator = build_orchestrator(audit.clone())?;

    let outcome = orchestrator.run(OBJECTIVE)?;

    match &outcome {
        RunOutcome::BudgetExhausted { steps_taken } => {
            println!("  Outcome: BUDGET_EXHAUSTED after {} steps", steps_taken);
        }
        RunOutcome::FinalAnswer { answer } => {
            println!("  UNEXPECTED: final answer {}", answer);
        }
    }

    let export = audit.export();
    println!(
        "  Audit chain integrity: {} ({} entries)",
        if audit.verify()? { "VERIFIED" } else { "FAILED" },
        export.entries.len()
    );
    println!();
    println!("  Scenario 3 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
