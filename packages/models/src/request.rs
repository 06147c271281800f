use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Default `maxResults` when the caller omits it.
pub const DEFAULT_MAX_RESULTS: u32 = 10;
/// Default `radiusMeters` when the caller omits it.
pub const DEFAULT_RADIUS_METERS: u32 = 1000;

const MAX_RESULTS_RANGE: std::ops::RangeInclusive<u32> = 1..=20;
const RADIUS_METERS_RANGE: std::ops::RangeInclusive<u32> = 100..=50_000;

/// A validated request for recommendations.
///
/// Either `lat`/`lng` or `address` must be present; this is enforced by
/// [`Request::validate`], not by the type itself, because the wire shape
/// allows either combination and the orchestrator needs a uniform place to
/// report all validation failures at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,
    #[serde(default)]
    pub force_refresh: bool,
    #[serde(default)]
    pub user_api_keys: HashMap<String, String>,
}

fn default_categories() -> Vec<Category> {
    vec![Category::All]
}

const fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

const fn default_radius_meters() -> u32 {
    DEFAULT_RADIUS_METERS
}

impl Default for Request {
    fn default() -> Self {
        Self {
            lat: None,
            lng: None,
            address: None,
            categories: default_categories(),
            max_results: DEFAULT_MAX_RESULTS,
            radius_meters: DEFAULT_RADIUS_METERS,
            force_refresh: false,
            user_api_keys: HashMap::new(),
        }
    }
}

impl Request {
    /// `true` if the request carries usable coordinates.
    #[must_use]
    pub const fn has_coordinates(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }

    /// Validates field-level invariants, collecting every violation rather
    /// than stopping at the first one, matching the `{errors:[...]}` wire
    /// shape for `400` responses.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.has_coordinates() && self.address.as_deref().is_none_or(str::is_empty) {
            errors.push("request must include either coordinates or an address".to_string());
        }

        if self.categories.is_empty() {
            errors.push("categories must not be empty".to_string());
        }

        if !MAX_RESULTS_RANGE.contains(&self.max_results) {
            errors.push(format!(
                "maxResults must be between {} and {}",
                MAX_RESULTS_RANGE.start(),
                MAX_RESULTS_RANGE.end()
            ));
        }

        if !RADIUS_METERS_RANGE.contains(&self.radius_meters) {
            errors.push(format!(
                "radiusMeters must be between {} and {}",
                RADIUS_METERS_RANGE.start(),
                RADIUS_METERS_RANGE.end()
            ));
        }

        if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            if !(-90.0..=90.0).contains(&lat) {
                errors.push("latitude must be between -90 and 90".to_string());
            }
            if !(-180.0..=180.0).contains(&lng) {
                errors.push("longitude must be between -180 and 180".to_string());
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_is_invalid_without_location() {
        let req = Request::default();
        assert!(!req.validate().is_empty());
    }

    #[test]
    fn coordinates_alone_are_sufficient() {
        let req = Request {
            lat: Some(43.4769),
            lng: Some(-79.7596),
            ..Request::default()
        };
        assert!(req.validate().is_empty());
    }

    #[test]
    fn out_of_range_max_results_is_rejected() {
        let req = Request {
            lat: Some(0.0),
            lng: Some(0.0),
            max_results: 50,
            ..Request::default()
        };
        assert!(req.validate().iter().any(|e| e.contains("maxResults")));
    }
}
