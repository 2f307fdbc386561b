//! # acta-core
//!
//! The budgeted, audit-bound reasoning loop for the ACTA runtime.
//!
//! This crate provides:
//! - The four core traits (`ReasoningClient`, `ActionParser`, `Tool`,
//!   `AuditSink`)
//! - The `ToolRegistry` that dispatches tool calls and absorbs their failures
//! - The `PromptBuilder` that assembles each think request
//! - The `Orchestrator` that wires them together under a hard step budget
//!
//! ## Usage
//!
//! ```rust,ignore
//! use acta_core::{Orchestrator, OrchestratorConfig, ToolRegistry};
//! use acta_core::traits::{ActionParser, AuditSink, ReasoningClient, Tool};
//! ```

pub mod orchestrator;
pub mod prompt;
pub mod registry;
pub mod traits;

pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use registry::{ToolRegistry, ToolSpec};
