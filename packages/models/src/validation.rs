use serde::{Deserialize, Serialize};

use crate::recommendation::Recommendation;

/// One validator's scoring of one candidate it was shown during
/// cross-validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationEntry {
    pub original: Recommendation,
    pub validation_score: f64,
    pub flagged_inaccurate: bool,
    pub flagged_out_of_range: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// The result of one `(validator, source)` cross-validation task.
///
/// An empty `items` vector means the pair failed or the validator flagged
/// nothing usable; this is not itself an error condition downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossValidationResult {
    pub validated_by: String,
    pub original_source: String,
    pub items: Vec<ValidationEntry>,
}

impl CrossValidationResult {
    #[must_use]
    pub fn empty(validated_by: impl Into<String>, original_source: impl Into<String>) -> Self {
        Self {
            validated_by: validated_by.into(),
            original_source: original_source.into(),
            items: Vec::new(),
        }
    }
}
