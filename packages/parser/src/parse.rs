//! Defensive structured parsing on top of [`crate::extract`].
//!
//! Every function here skips malformed entries rather than failing the
//! whole batch: one bad item in a 15-item LLM response must not throw away
//! the other 14.

use serde_json::Value;

use crate::extract::{extract_candidate, sanitize};

/// Default confidence applied when a generated candidate omits
/// `confidenceScore` entirely.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// One candidate out of a generation-stage response.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCandidate {
    pub name: String,
    pub description: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub confidence_score: f64,
    pub highlights: Vec<String>,
    pub why_recommended: Option<String>,
}

/// One entry out of a cross-validation response.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationItem {
    pub name: String,
    pub validation_score: f64,
    pub flagged_as_inaccurate: bool,
    pub flagged_as_out_of_range: bool,
    pub comment: Option<String>,
}

/// One entry out of a synthesis response.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedEntry {
    pub name: String,
    pub description: String,
    pub highlights: Vec<String>,
    pub why_recommended: String,
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn coerce_highlights(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(coerce_string)
                .take(5)
                .collect()
        })
        .unwrap_or_default()
}

/// Extracts and parses the `recommendations` array from a generation-stage
/// response. Returns an empty vector (never an error) if nothing usable
/// could be recovered from `text`.
#[must_use]
pub fn parse_generation(text: &str) -> Vec<GeneratedCandidate> {
    let Some(value) = extract_array(text, "recommendations") else {
        return Vec::new();
    };

    value
        .into_iter()
        .filter_map(|item| {
            let name = coerce_string(item.get("name")?)?;
            let description = item
                .get("description")
                .and_then(coerce_string)
                .unwrap_or_default();
            let confidence_score = item
                .get("confidenceScore")
                .and_then(coerce_f64)
                .map_or(DEFAULT_CONFIDENCE, |v| v.clamp(0.0, 1.0));

            Some(GeneratedCandidate {
                name,
                description,
                address: item.get("address").and_then(coerce_string),
                lat: item.get("latitude").and_then(coerce_f64),
                lng: item.get("longitude").and_then(coerce_f64),
                confidence_score,
                highlights: item.get("highlights").map(coerce_highlights).unwrap_or_default(),
                why_recommended: item.get("whyRecommended").and_then(coerce_string),
            })
        })
        .collect()
}

/// Extracts and parses the `validations` array from a cross-validation
/// response.
#[must_use]
pub fn parse_validation(text: &str) -> Vec<ValidationItem> {
    let Some(value) = extract_array(text, "validations") else {
        return Vec::new();
    };

    value
        .into_iter()
        .filter_map(|item| {
            let name = coerce_string(item.get("name")?)?;
            let validation_score = item
                .get("validationScore")
                .and_then(coerce_f64)
                .map_or(DEFAULT_CONFIDENCE, |v| v.clamp(0.0, 1.0));

            Some(ValidationItem {
                name,
                validation_score,
                flagged_as_inaccurate: item.get("flaggedAsInaccurate").is_some_and(coerce_bool),
                flagged_as_out_of_range: item.get("flaggedAsOutOfRange").is_some_and(coerce_bool),
                comment: item.get("comment").and_then(coerce_string),
            })
        })
        .collect()
}

/// Extracts and parses the `recommendations` array from a synthesis
/// response. Order is preserved as returned by the model; the caller
/// (stage 7) is responsible for matching entries back by name and never
/// reordering its own ranked list.
#[must_use]
pub fn parse_synthesis(text: &str) -> Vec<SynthesizedEntry> {
    let Some(value) = extract_array(text, "recommendations") else {
        return Vec::new();
    };

    value
        .into_iter()
        .filter_map(|item| {
            let name = coerce_string(item.get("name")?)?;
            Some(SynthesizedEntry {
                name,
                description: item.get("description").and_then(coerce_string).unwrap_or_default(),
                highlights: item.get("highlights").map(coerce_highlights).unwrap_or_default(),
                why_recommended: item
                    .get("whyRecommended")
                    .and_then(coerce_string)
                    .unwrap_or_default(),
            })
        })
        .collect()
}

fn extract_array(text: &str, key: &str) -> Option<Vec<Value>> {
    let candidate = extract_candidate(text, key)?;
    let sanitized = sanitize(&candidate);
    let parsed: Value = serde_json::from_str(&sanitized).ok()?;
    parsed.get(key)?.as_array().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_generation_response() {
        let text = r#"{"recommendations":[{"name":"Joe's Diner","description":"Classic diner",
            "confidenceScore":0.8,"highlights":["cozy","cheap"],"whyRecommended":"great coffee"}]}"#;
        let parsed = parse_generation(text);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "Joe's Diner");
        assert!((parsed[0].confidence_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn missing_confidence_defaults_to_point_seven() {
        let text = r#"{"recommendations":[{"name":"Unique Place","description":"x"}]}"#;
        let parsed = parse_generation(text);
        assert!((parsed[0].confidence_score - DEFAULT_CONFIDENCE).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let text = r#"{"recommendations":[{"name":"A","description":"x","confidenceScore":5}]}"#;
        let parsed = parse_generation(text);
        assert!((parsed[0].confidence_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_entry_is_skipped_not_fatal() {
        let text = r#"{"recommendations":[{"description":"no name field"},
            {"name":"Valid","description":"ok"}]}"#;
        let parsed = parse_generation(text);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "Valid");
    }

    #[test]
    fn parses_reasoning_buffer_fallback_content() {
        let text = r#"some reasoning trace... {"recommendations":[{"name":"A","description":"d"}]}"#;
        let parsed = parse_generation(text);
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn parses_validation_with_defensive_bool_coercion() {
        let text = r#"{"validations":[{"name":"Joe's Diner","validationScore":0.9,
            "flaggedAsInaccurate":"true","flaggedAsOutOfRange":false}]}"#;
        let parsed = parse_validation(text);
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].flagged_as_inaccurate);
        assert!(!parsed[0].flagged_as_out_of_range);
    }

    #[test]
    fn parses_synthesis_preserving_order() {
        let text = r#"{"recommendations":[{"name":"B","description":"second"},
            {"name":"A","description":"first"}]}"#;
        let parsed = parse_synthesis(text);
        assert_eq!(parsed[0].name, "B");
        assert_eq!(parsed[1].name, "A");
    }
}
