//! # acta-ref-finance
//!
//! Finance reference deployment for the ACTA decision loop.
//!
//! Demonstrates three scenarios over a fictional corporate ledger:
//!
//! 1. **Quarterly Expense Audit** — the happy path: extract, classify,
//!    check policy, report, with a persistent JSONL audit file.
//! 2. **Unknown Tool Recovery** — a bad tool name is refused, audited, fed
//!    back, and the model recovers.
//! 3. **Runaway Loop Containment** — a model that never commits to an
//!    action is stopped by the step budget, as a defined outcome.
//!
//! All data is hardcoded and fictional. The scenarios use scripted model
//! transcripts, so no external endpoint is contacted.

pub mod ledger;
pub mod model;
pub mod scenarios;
