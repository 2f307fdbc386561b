//! # acta-llm
//!
//! Implementations of [`acta_core::traits::ReasoningClient`]:
//!
//! - [`HttpReasoningClient`] — blocking client for an Ollama-style
//!   `/api/generate` endpoint, one request per completion.
//! - [`ScriptedClient`] — deterministic playback of canned responses, used
//!   by the reference scenarios and anywhere a live model is unwanted.
//!
//! Both are synchronous. The loop is strictly turn-based, so there is
//! nothing useful to overlap a completion with.

pub mod http;
pub mod script;

pub use http::{EndpointConfig, HttpReasoningClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use script::ScriptedClient;
