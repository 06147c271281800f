use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::category::Category;
use crate::place::Place;

/// Maps a `[0,1]` score onto a discrete confidence band.
///
/// `≥0.9 VeryHigh; ≥0.7 High; ≥0.4 Medium; else Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceLevel {
    /// Pure function of score to band. The bands are fixed by the wire
    /// contract and must not be made configurable.
    #[must_use]
    pub fn for_score(score: f64) -> Self {
        if score >= 0.9 {
            Self::VeryHigh
        } else if score >= 0.7 {
            Self::High
        } else if score >= 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// A candidate recommendation, either freshly generated by a provider or
/// already folded into a consensus result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub name: String,
    pub description: String,
    pub category: Category,
    pub base_confidence: f64,
    pub level: ConfidenceLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    pub source_provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enriched_place: Option<Place>,
    pub highlights: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_recommended: Option<String>,
    pub agreement_count: u32,
}

impl Recommendation {
    /// Re-derives `level` from `base_confidence`, clamping the confidence
    /// first. Call after any mutation of `base_confidence`.
    pub fn recompute_level(&mut self) {
        self.base_confidence = crate::clamp01(self.base_confidence);
        self.level = ConfidenceLevel::for_score(self.base_confidence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bands_match_score_thresholds() {
        assert_eq!(ConfidenceLevel::for_score(1.0), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::for_score(0.9), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::for_score(0.899_999), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::for_score(0.7), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::for_score(0.4), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::for_score(0.399_999), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::for_score(0.0), ConfidenceLevel::Low);
    }
}
