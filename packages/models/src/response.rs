use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::recommendation::Recommendation;

/// Bookkeeping returned alongside every response so the caller can see
/// partial successes even when the overall call succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub providers_used: Vec<String>,
    pub providers_failed: Vec<String>,
    pub enriched: bool,
    pub total_candidates_evaluated: u32,
    #[serde(with = "millis")]
    pub total_elapsed: Duration,
    pub synthesized_by: String,
}

/// The final, caller-facing recommendation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_address: Option<String>,
    pub category: Category,
    pub categories: Vec<Category>,
    pub recommendations: Vec<Recommendation>,
    pub metadata: Metadata,
    pub from_cache: bool,
    pub generated_at: DateTime<Utc>,
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        #[allow(clippy::cast_possible_truncation)]
        let millis = value.as_millis() as u64;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
