//! # acta-parser
//!
//! Turns raw reasoning text into structured actions.
//!
//! This crate provides [`marker::MarkerParser`], which implements the
//! [`acta_core::traits::ActionParser`] trait. It recognizes the three-marker
//! grammar that the system prompt teaches the model:
//!
//! - `ACTION: <tool_name>` followed by `ACTION_INPUT: <json>` — invoke a tool
//! - `FINAL_ANSWER: <json or text>` — terminate the run with an answer
//! - neither marker — keep reasoning for another step
//!
//! Parse failures are recoverable: the orchestrator logs them and feeds the
//! failure back to the model instead of aborting the run.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use acta_core::traits::ActionParser;
//! use acta_parser::marker::MarkerParser;
//!
//! let parser = MarkerParser::new();
//! let action = parser.parse("ACTION: policy_lookup\nACTION_INPUT: \"CAPEX\"")?;
//! ```

pub mod marker;
