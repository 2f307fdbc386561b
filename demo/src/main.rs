//! ACTA Finance Reference Deployment — Demo CLI
//!
//! Runs the finance demo scenarios, verifies audit files offline, or drives
//! the loop against a live Ollama-style endpoint. The scenarios use scripted
//! model transcripts; only `live` contacts a real endpoint.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- expense-audit
//!   cargo run -p demo -- unknown-tool
//!   cargo run -p demo -- runaway-loop
//!   cargo run -p demo -- verify audit_trail.jsonl
//!   cargo run -p demo -- live "Audit last quarter's transactions"

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use acta_audit::{verify_file, AuditFileConfig, FileAuditLog, HashAlgorithm};
use acta_contracts::{error::ActaResult, run::RunOutcome};
use acta_core::{Orchestrator, OrchestratorConfig, ToolRegistry};
use acta_llm::{EndpointConfig, HttpReasoningClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use acta_parser::marker::MarkerParser;
use acta_ref_finance::{
    ledger::ledger_extractor,
    model::AmountThresholdModel,
    scenarios::{expense_audit, runaway_loop, unknown_tool},
};
use acta_tools::{MlClassifier, PolicyLookup, PolicyStore};

const DEFAULT_AUDIT_FILE: &str = "audit_trail.jsonl";

// ── CLI definition ────────────────────────────────────────────────────────────

/// ACTA — auditable tool-calling agent loop, finance demo.
///
/// Each subcommand runs one or all of the scripted finance scenarios,
/// verifies an audit file, or drives the loop against a live endpoint.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "ACTA finance reference deployment demo",
    long_about = "Runs ACTA finance demo scenarios showing the reasoning loop,\n\
                  tool dispatch with input validation, failure feedback, and\n\
                  hash-chained audit trail integrity."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three finance scenarios in sequence.
    RunAll {
        /// Audit file used by the expense audit scenario.
        #[arg(long, default_value = DEFAULT_AUDIT_FILE)]
        audit_file: PathBuf,
    },
    /// Scenario 1: Quarterly Expense Audit (full pipeline, JSONL audit file).
    ExpenseAudit {
        /// Where the hash-chained audit log is written.
        #[arg(long, default_value = DEFAULT_AUDIT_FILE)]
        audit_file: PathBuf,
    },
    /// Scenario 2: Unknown Tool Recovery (refusal fed back as observation).
    UnknownTool,
    /// Scenario 3: Runaway Loop Containment (step budget as the backstop).
    RunawayLoop,
    /// Verify the hash chain of an audit file offline.
    Verify {
        /// Path to a JSONL audit file.
        file: PathBuf,
        /// Recompute with SHA-512 instead of SHA-256.
        #[arg(long)]
        sha512: bool,
    },
    /// Drive the loop against a live Ollama-style endpoint.
    Live {
        /// The objective handed to the loop.
        objective: String,
        /// Endpoint base URL.
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        endpoint: String,
        /// Model name passed to the endpoint.
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,
        /// Where the hash-chained audit log is written.
        #[arg(long, default_value = DEFAULT_AUDIT_FILE)]
        audit_file: PathBuf,
        /// Hard step budget for the run.
        #[arg(long, default_value_t = 10)]
        max_steps: u64,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Structured logging; set RUST_LOG=debug for the loop's step-by-step trace.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = match cli.command {
        Command::RunAll { audit_file } => run_all(&audit_file),
        Command::ExpenseAudit { audit_file } => expense_audit::run_scenario(&audit_file),
        Command::UnknownTool => unknown_tool::run_scenario(),
        Command::RunawayLoop => runaway_loop::run_scenario(),
        Command::Verify { file, sha512 } => run_verify(&file, sha512),
        Command::Live {
            objective,
            endpoint,
            model,
            audit_file,
            max_steps,
        } => run_live(&objective, endpoint, model, &audit_file, max_steps),
    };

    match result {
        Ok(()) => {
            println!("Done.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_all(audit_file: &std::path::Path) -> ActaResult<()> {
    expense_audit::run_scenario(audit_file)?;
    unknown_tool::run_scenario()?;
    runaway_loop::run_scenario()?;
    Ok(())
}

fn run_verify(file: &std::path::Path, sha512: bool) -> ActaResult<()> {
    let algorithm = if sha512 {
        HashAlgorithm::Sha512
    } else {
        HashAlgorithm::Sha256
    };
    let report = verify_file(file, algorithm)?;

    println!("=== Audit File Verification ===");
    println!();
    println!("  File:          {}", file.display());
    println!("  Entries:       {}", report.entry_count);
    println!("  Terminal hash: {}", report.terminal_hash);
    println!(
        "  Chain:         {}",
        if report.ok { "VERIFIED" } else { "BROKEN" }
    );
    if let Some(detail) = &report.detail {
        println!("  Detail:        {}", detail);
    }
    println!();

    Ok(())
}

fn run_live(
    objective: &str,
    endpoint: String,
    model: String,
    audit_file: &std::path::Path,
    max_steps: u64,
) -> ActaResult<()> {
    println!("=== Live Run ===");
    println!();
    println!("  Endpoint:   {}", endpoint);
    println!("  Model:      {}", model);
    println!("  Objective:  {}", objective);
    println!("  Audit file: {}", audit_file.display());
    println!();

    let client = HttpReasoningClient::new(EndpointConfig {
        base_url: endpoint,
        model,
        ..EndpointConfig::default()
    })?;

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ledger_extractor()?));
    registry.register(Box::new(MlClassifier::new(Arc::new(
        AmountThresholdModel::default(),
    ))));
    registry.register(Box::new(PolicyLookup::new(PolicyStore::from_toml_str(
        expense_audit::FINANCE_POLICY,
    )?)));

    let audit = Arc::new(FileAuditLog::open(AuditFileConfig::new(audit_file))?);
    let mut orchestrator = Orchestrator::new(
        OrchestratorConfig {
            max_steps,
            ..OrchestratorConfig::default()
        },
        Box::new(client),
        Box::new(MarkerParser::new()),
        registry,
        audit,
    )?;

    match orchestrator.run(objective)? {
        RunOutcome::FinalAnswer { answer } => {
            println!("  Final answer:");
            println!(
                "    {}",
                serde_json::to_string_pretty(&answer)
                    .unwrap_or_else(|_| answer.to_string())
                    .replace('\n', "\n    ")
            );
        }
        RunOutcome::BudgetExhausted { steps_taken } => {
            println!("  Budget exhausted after {} steps without an answer.", steps_taken);
        }
    }

    let report = verify_file(audit_file, HashAlgorithm::Sha256)?;
    println!();
    println!(
        "  Audit chain integrity: {} ({} entries)",
        if report.ok { "VERIFIED" } else { "FAILED" },
        report.entry_count
    );
    println!();

    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("ACTA — Auditable Tool-Calling Agent Loop");
    println!("Finance Reference Demo");
    println!("========================================");
    println!();
    println!("Loop per step:");
    println!("  [1] Prompt built from objective + full step history");
    println!("  [2] Raw model text audited (LLM_RAW) before anything acts on it");
    println!("  [3] Marker grammar parsed into a typed action");
    println!("  [4] Tool dispatch with schema validation; failures become observations");
    println!("  [5] Every transition appended to the SHA-256 hash chain");
    println!();
}
