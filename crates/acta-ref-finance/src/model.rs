//! The reference classification model.
//!
//! A deliberately transparent stand-in for a trained model: one numeric
//! threshold on the transaction amount. Deterministic, explainable in an
//! audit, and good enough to route spend for the demo scenarios. A real
//! deployment would implement [`ClassifierModel`] over an actual model
//! artifact and swap it in without touching the tool.

use acta_tools::{ClassifierModel, FeatureMatrix, ModelError};

pub const LABEL_ESCALATE: &str = "ESCALATE";
pub const LABEL_ROUTINE: &str = "ROUTINE";

/// Labels each row by comparing one feature column against a threshold.
#[derive(Debug, Clone)]
pub struct AmountThresholdModel {
    threshold: f64,
    feature: String,
}

impl AmountThresholdModel {
    pub fn new(threshold: f64, feature: &str) -> Self {
        Self {
            threshold,
            feature: feature.to_string(),
        }
    }
}

impl Default for AmountThresholdModel {
    /// Mirrors the CAPEX approval threshold: anything over $5,000 escalates.
    fn default() -> Self {
        Self::new(5000.0, "amount")
    }
}

impl ClassifierModel for AmountThresholdModel {
    fn version(&self) -> &str {
        "amount-threshold-v1"
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<String>, ModelError> {
        let column = features
            .columns
            .iter()
            .position(|name| name == &self.feature)
            .ok_or_else(|| ModelError::FeatureMismatch {
                reason: format!(
                    "feature '{}' not in matrix columns {:?}",
                    self.feature, features.columns
                ),
            })?;

        Ok(features
            .rows
            .iter()
            .map(|row| {
                if row[column] > self.threshold {
                    LABEL_ESCALATE.to_string()
                } else {
                    LABEL_ROUTINE.to_string()
                }
            })
            .collect())
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
