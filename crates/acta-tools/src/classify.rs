//! Record classification behind a pluggable model.
//!
//! `MlClassifier` is the tool surface: it turns JSON records into a dense
//! feature matrix, hands the matrix to a [`ClassifierModel`], and merges the
//! returned label into each record under the `classification` key. The model
//! itself is a trait so the reference deployment can ship a deterministic
//! rule model while a real embedding or tree model slots in unchanged.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use acta_contracts::{error::ToolError, observation::Record};
use acta_core::traits::Tool;

/// Column-major description of the numeric features extracted from a batch
/// of records. Rows are in record order; every row has one value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("feature matrix mismatch: {reason}")]
    FeatureMismatch { reason: String },
    #[error("inference failed: {reason}")]
    Inference { reason: String },
}

/// Produces one label per input row.
///
/// Implementations must be deterministic for a given matrix; the audit trail
/// records tool results, and a model that answers differently on replay
/// makes the trail unexplainable.
pub trait ClassifierModel: Send + Sync {
    /// Identifies the model (and its revision) in logs.
    fn version(&self) -> &str;

    /// One label per row, in row order.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<String>, ModelError>;
}

/// Tool wrapper that classifies a batch of JSON records.
///
/// Feature columns are the numeric fields of the first record, minus the
/// excluded identifier columns, in sorted order. Every record in the batch
/// must carry every feature column with a numeric value; a batch with holes
/// is rejected rather than silently imputed.
pub struct MlClassifier {
    model: Arc<dyn ClassifierModel>,
    excluded_columns: BTreeSet<String>,
    description: String,
}

impl MlClassifier {
    pub fn new(model: Arc<dyn ClassifierModel>) -> Self {
        Self::with_excluded_columns(model, &["id", "timestamp"])
    }

    /// Exclude different identifier columns from the feature matrix.
    pub fn with_excluded_columns(model: Arc<dyn ClassifierModel>, excluded: &[&str]) -> Self {
        let description = format!(
            "Classifies a JSON array of records by their numeric fields and adds a \
             'classification' label to each. Model: {}.",
            model.version()
        );
        Self {
            model,
            excluded_columns: excluded.iter().map(|c| c.to_string()).collect(),
            description,
        }
    }

    fn feature_columns(&self, first: &Record) -> Vec<String> {
        first
            .iter()
            .filter(|(name, value)| value.is_number() && !self.excluded_columns.contains(*name))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Tool for MlClassifier {
    fn name(&self) -> &str {
        "ml_classifier"
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Option<Value> {
        Some(json!({
            "type": "array",
            "items": { "type": "object" }
        }))
    }

    fn invoke(&self, input: &Value) -> Result<Vec<Record>, ToolError> {
        let items = input.as_array().ok_or_else(|| ToolError::InvalidInput {
            reason: "input must be a JSON array of records".to_string(),
        })?;
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_object() {
                Some(record) => records.push(record.clone()),
                None => {
                    return Err(ToolError::InvalidInput {
                        reason: format!("record {} is not a JSON object", index),
                    })
                }
            }
        }

        // Record iteration order is alphabetical already (serde_json maps
        // are sorted), so the column list is stable across calls.
        let columns = self.feature_columns(&records[0]);
        if columns.is_empty() {
            return Err(ToolError::InvalidInput {
                reason: "records carry no numeric feature columns".to_string(),
            });
        }

        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let mut row = Vec::with_capacity(columns.len());
            for column in &columns {
                let value = record
                    .get(column)
                    .and_then(Value::as_f64)
                    .ok_or_else(|| ToolError::InvalidInput {
                        reason: format!(
                            "record {} is missing numeric feature '{}'",
                            index, column
                        ),
                    })?;
                row.push(value);
            }
            rows.push(row);
        }

        let matrix = FeatureMatrix { columns, rows };
        debug!(
            model = self.model.version(),
            records = records.len(),
            features = matrix.columns.len(),
            "running classification"
        );

        let labels = self
            .model
            .predict(&matrix)
            .map_err(|e| ToolError::Execution {
                reason: e.to_string(),
            })?;
        if labels.len() != records.len() {
            return Err(ToolError::Execution {
                reason: format!(
                    "model returned {} labels for {} records",
                    labels.len(),
                    records.len()
                ),
            });
        }

        for (record, label) in records.iter_mut().zip(labels) {
            record.insert("classification".to_string(), Value::String(label));
        }
        Ok(records)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
