//! # acta-tools
//!
//! Built-in tool handlers for the decision loop.
//!
//! Each tool implements [`acta_core::traits::Tool`] and is registered with a
//! `ToolRegistry` by the embedding application:
//!
//! - [`SqlExtractor`] — read-only, allow-listed `SELECT` queries against a
//!   SQLite database.
//! - [`MlClassifier`] — labels a batch of JSON records via a pluggable
//!   [`ClassifierModel`].
//! - [`PolicyLookup`] — exact-match advisory lookup over a [`PolicyStore`]
//!   loaded from TOML or built in code.
//!
//! Tools never terminate the run. They report failure through `ToolError`,
//! the registry converts that into a failure observation, and the model
//! decides what to do about it.

pub mod classify;
pub mod policy;
pub mod sql;

pub use classify::{ClassifierModel, FeatureMatrix, MlClassifier, ModelError};
pub use policy::{PolicyLookup, PolicyStore, NO_POLICY_FOUND};
pub use sql::SqlExtractor;
