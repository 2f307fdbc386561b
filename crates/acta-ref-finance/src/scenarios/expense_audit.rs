//! Scenario 1: Quarterly Expense Audit
//!
//! The happy path: a scripted model works through a full extract-classify-
//! check pipeline and files a final report, with every step landing in a
//! persistent hash-chained audit file.
//!
//! Loop walk-through for the demo run:
//!   1. INIT entry written before any reasoning happens
//!   2. Step 0: model queries the transactions table via sql_extractor
//!   3. Step 1: model classifies the standout amounts via ml_classifier
//!   4. Step 2: model checks the CAPEX advisory via policy_lookup
//!   5. Step 3: model declares FINAL_ANSWER; the run finalizes immediately
//!   6. Audit chain re-read from disk and verified at the end

use std::path::Path;
use std::sync::Arc;

use acta_audit::{verify_file, AuditFileConfig, FileAuditLog, HashAlgorithm};
use acta_contracts::{
    error::ActaResult,
    run::RunOutcome,
};
use acta_core::{traits::AuditSink, Orchestrator, OrchestratorConfig, ToolRegistry};
use acta_llm::ScriptedClient;
use acta_parser::marker::MarkerParser;
use acta_tools::{MlClassifier, PolicyLookup, PolicyStore};

use crate::ledger::ledger_extractor;
use crate::model::AmountThresholdModel;

// ── Policy TOML ───────────────────────────────────────────────────────────────

/// Embedded corporate expense policies shared by the finance scenarios.
pub const FINANCE_POLICY: &str = include_str!("../../policies/finance.toml");

/// The objective handed to the loop in this scenario.
pub const OBJECTIVE: &str =
    "Audit last quarter's transactions and report any that need escalation under company policy.";

// ── Scripted model ────────────────────────────────────────────────────────────

/// The canned reasoning transcript: extract, classify, check policy, report.
pub fn scripted_responses() -> Vec<String> {
    vec![
        "THOUGHT: I should pull the raw transactions before judging anything.\n\
         ACTION: sql_extractor\n\
         ACTION_INPUT: {\"query\": \"SELECT id, vendor, category, amount FROM transactions ORDER BY id\"}"
            .to_string(),
        "THOUGHT: Two amounts stand out far above the rest. I will classify the candidates.\n\
         ACTION: ml_classifier\n\
         ACTION_INPUT: [\n\
           {\"id\": 4, \"vendor\": \"Acme Office Interiors\", \"category\": \"CAPEX\", \"amount\": 8450.0},\n\
           {\"id\": 9, \"vendor\": \"Hooli Cloud Services\", \"category\": \"CAPEX\", \"amount\": 12200.0},\n\
           {\"id\": 11, \"vendor\": \"Globex Catering\", \"category\": \"MEALS\", \"amount\": 1840.0}\n\
         ]"
            .to_string(),
        "THOUGHT: Both escalations are capital expenses. What does policy require for CAPEX?\n\
         ACTION: policy_lookup\n\
         ACTION_INPUT: \"CAPEX\""
            .to_string(),
        "THOUGHT: I have everything needed for the report.\n\
         FINAL_ANSWER: {\"escalations\": [{\"id\": 4, \"vendor\": \"Acme Office Interiors\", \"amount\": 8450.0}, \
         {\"id\": 9, \"vendor\": \"Hooli Cloud Services\", \"amount\": 12200.0}], \
         \"policy\": \"Transactions over $5,000 require Level 3 approval.\", \"reviewed\": 14}"
            .to_string(),
    ]
}

// ── Wiring ────────────────────────────────────────────────────────────────────

/// Wire the full loop over the seeded ledger and the scripted transcript.
pub fn build_orchestrator(audit: Arc<dyn AuditSink>) -> ActaResult<Orchestrator> {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ledger_extractor()?));
    registry.register(Box::new(MlClassifier::new(Arc::new(
        AmountThresholdModel::default(),
    ))));
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

/// Run Scenario 1 against a JSONL audit file at `audit_path`.
///
/// The file is created on first use and extended on later runs; entries are
/// scoped to their run by `run_id`, so one file can hold many audits.
pub fn run_scenario(audit_path: &Path) -> ActaResult<()> {
    println!("=== Scenario 1: Quarterly Expense Audit ===");
    println!();
    println!("  Objective:  {}", OBJECTIVE);
    println!("  Audit file: {}", audit_path.display());
    println!();

    let audit = Arc::new(FileAuditLog::open(AuditFileConfig::new(audit_path))?);
    let mut orchestrator = build_orchestrator(audit)?;

    let outcome = orchestrator.run(OBJECTIVE)?;

    match &outcome {
        RunOutcome::FinalAnswer { answer } => {
            println!("  Final answer:");
            println!(
                "    {}",
                serde_json::to_string_pretty(answer)
                    .unwrap_or_else(|_| answer.to_string())
                    .replace('\n', "\n    ")
            );
            println!();
            println!("  Steps taken: {}", orchestrator.history().len() + 1);
        }
        RunOutcome::BudgetExhausted { steps_taken } => {
            println!("  UNEXPECTED: budget exhausted after {} steps", steps_taken);
        }
    }

    let report = verify_file(audit_path, HashAlgorithm::Sha256)?;
    println!(
        "  Audit chain integrity: {} ({} entries, terminal hash {}...)",
        if report.ok { "VERIFIED" } else { "FAILED" },
        report.entry_count,
        &report.terminal_hash[..12.min(report.terminal_hash.len())]
    );
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
