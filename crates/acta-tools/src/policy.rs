//! Policy advisory lookup.
//!
//! A `PolicyStore` maps a category code (e.g. `"CAPEX"`) to one advisory
//! string. Stores are loaded from a TOML document or built in code; lookup
//! is an exact, case-sensitive match. Category codes are part of the
//! interface the model is taught, so near-misses must fail loudly rather
//! than fuzzy-match to the wrong policy.
//!
//! An unknown category is not an error. The tool answers with the
//! [`NO_POLICY_FOUND`] sentinel so the model can reason about the absence
//! of a policy instead of retrying a failed call.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use acta_contracts::{
    error::{ActaError, ActaResult, ToolError},
    observation::Record,
};
use acta_core::traits::Tool;

/// Advisory returned for categories the store does not know.
pub const NO_POLICY_FOUND: &str = "No specific policy found.";

/// A single policy entry in a TOML policy file.
///
/// Example:
/// ```toml
/// [[policies]]
/// category = "CAPEX"
/// advisory = "Transactions over $5,000 require Level 3 approval."
/// ```
#[derive(Debug, Clone, Deserialize)]
struct PolicyEntry {
    category: String,
    advisory: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PolicyFile {
    policies: Vec<PolicyEntry>,
}

/// An in-memory map of category codes to advisory strings.
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    policies: BTreeMap<String, String>,
}

impl PolicyStore {
    /// Parse `s` as a TOML policy document.
    ///
    /// Returns `ActaError::Config` if the TOML is malformed or does not
    /// match the expected shape. A duplicate category keeps the last
    /// occurrence, matching TOML reading order.
    pub fn from_toml_str(s: &str) -> ActaResult<Self> {
        let file: PolicyFile = toml::from_str(s).map_err(|e| ActaError::Config {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;
        let policies = file
            .policies
            .into_iter()
            .map(|entry| (entry.category, entry.advisory))
            .collect();
        Ok(Self { policies })
    }

    /// Read the file at `path` and parse it as a TOML policy document.
    pub fn from_file(path: &Path) -> ActaResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ActaError::Config {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The built-in corporate expense policies.
    pub fn builtin() -> Self {
        Self::default()
            .with_policy(
                "CAPEX",
                "Transactions over $5,000 require Level 3 approval.",
            )
            .with_policy("TRAVEL", "Receipts required for expenses over $25.")
    }

    /// Add or replace one policy.
    pub fn with_policy(mut self, category: &str, advisory: &str) -> Self {
        self.policies
            .insert(category.to_string(), advisory.to_string());
        self
    }

    /// Exact-match lookup.
    pub fn lookup(&self, category: &str) -> Option<&str> {
        self.policies.get(category).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Known category codes, sorted.
    pub fn categories(&self) -> Vec<&str> {
        self.policies.keys().map(String::as_str).collect()
    }
}

/// Tool surface over a [`PolicyStore`].
pub struct PolicyLookup {
    store: PolicyStore,
    description: String,
}

impl PolicyLookup {
    pub fn new(store: PolicyStore) -> Self {
        let description = format!(
            "Looks up the company policy advisory for a category code. \
             Input: a JSON string. Known categories: {}.",
            store.categories().join(", ")
        );
        Self { store, description }
    }
}

impl Tool for PolicyLookup {
    fn name(&self) -> &str {
        "policy_lookup"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Option<Value> {
        Some(json!({ "type": "string" }))
    }

    fn invoke(&self, input: &Value) -> Result<Vec<Record>, ToolError> {
        let category = input.as_str().ok_or_else(|| ToolError::InvalidInput {
            reason: "input must be a JSON string naming the policy category".to_string(),
        })?;

        let advisory = self.store.lookup(category).unwrap_or(NO_POLICY_FOUND);
        debug!(category, found = advisory != NO_POLICY_FOUND, "policy lookup");

        let mut record = Record::new();
        record.insert("category".to_string(), Value::String(category.to_string()));
        record.insert("advisory".to_string(), Value::String(advisory.to_string()));
        Ok(vec![record])
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use acta_contracts::error::{ActaError, ToolError};
    use acta_core::traits::Tool;

    use super::{PolicyLookup, PolicyStore, NO_POLICY_FOUND};

    // ── Test cases ────────────────────────────────────────────────────────────

    #[test]
    fn test_builtin_capex_advisory() {
        let tool = PolicyLookup::new(PolicyStore::builtin());
        let records = tool.invoke(&json!("CAPEX")).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0]["advisory"],
            json!("Transactions over $5,000 require Level 3 approval.")
        );
        assert_eq!(records[0]["category"], json!("CAPEX"));
    }

    #[test]
    fn test_builtin_travel_advisory() {
        let tool = PolicyLookup::new(PolicyStore::builtin());
        let records = tool.invoke(&json!("TRAVEL")).unwrap();

        assert_eq!(
            records[0]["advisory"],
            json!("Receipts required for expenses over $25.")
        );
    }

    #[test]
    fn test_unknown_category_is_a_sentinel_success() {
        let tool = PolicyLookup::new(PolicyStore::builtin());
        let records = tool.invoke(&json!("OPEX")).unwrap();

        assert_eq!(records[0]["advisory"], json!(NO_POLICY_FOUND));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let tool = PolicyLookup::new(PolicyStore::builtin());
        let records = tool.invoke(&json!("capex")).unwrap();

        assert_eq!(records[0]["advisory"], json!(NO_POLICY_FOUND));
    }

    #[test]
    fn test_non_string_input_is_rejected() {
        let tool = PolicyLookup::new(PolicyStore::builtin());
        let result = tool.invoke(&json!({ "category": "CAPEX" }));

        assert!(matches!(result, Err(ToolError::InvalidInput { .. })));
    }

    #[test]
    fn test_store_loads_from_toml() {
        let store = PolicyStore::from_toml_str(
            r#"
            [[policies]]
            category = "CAPEX"
            advisory = "Transactions over $5,000 require Level 3 approval."

            [[policies]]
            category = "GIFTS"
            advisory = "Gifts above $100 must be declared."
            "#,
        )
        .unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.lookup("GIFTS"),
            Some("Gifts above $100 must be declared.")
        );
        assert_eq!(store.lookup("TRAVEL"), None);
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        let result = PolicyStore::from_toml_str("policies = \"not a list\"");
        assert!(matches!(result, Err(ActaError::Config { .. })));
    }

    #[test]
    fn test_categories_are_sorted() {
        let store = PolicyStore::builtin().with_policy("AUDIT", "Annual audit in Q1.");
        assert_eq!(store.categories(), vec!["AUDIT", "CAPEX", "TRAVEL"]);
    }
}
