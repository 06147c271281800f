use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::recommendation::Recommendation;

/// The outcome of one provider's generation call within a single request.
///
/// `success=false` providers still appear here (with an empty
/// `recommendations` list) so the orchestrator can report
/// `metadata.providersFailed` without losing track of who was tried.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResult {
    pub provider_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl ProviderResult {
    #[must_use]
    pub fn failure(provider_name: impl Into<String>, error_message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            provider_name: provider_name.into(),
            success: false,
            error_message: Some(error_message.into()),
            recommendations: Vec::new(),
            raw_response: None,
            elapsed,
        }
    }
}

/// `Duration` is represented on the wire as whole milliseconds; this is an
/// internal detail of the response serialization, not part of the provider
/// wire protocol those adapters speak.
mod duration_millis {
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
