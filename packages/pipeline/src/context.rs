use vicinity_models::{CrossValidationResult, ProviderResult, Recommendation, Request, Response};

/// Mutable per-request state threaded through the eight stages in order.
///
/// Created by the orchestrator, mutated only by stage functions, and
/// dropped once the response is returned (§2).
pub struct PipelineContext {
    pub request: Request,

    pub lat: f64,
    pub lng: f64,
    pub resolved_address: Option<String>,
    pub geocoding_available: bool,

    pub cache_key: String,
    pub cache_hit: bool,
    pub cached_response: Option<Response>,

    pub generation_results: Vec<ProviderResult>,
    pub validation_results: Vec<CrossValidationResult>,

    pub enriched: bool,
    pub ranked: Vec<Recommendation>,
    pub synthesized_by: String,
}

impl PipelineContext {
    #[must_use]
    pub fn new(request: Request) -> Self {
        Self {
            request,
            lat: 0.0,
            lng: 0.0,
            resolved_address: None,
            geocoding_available: false,
            cache_key: String::new(),
            cache_hit: false,
            cached_response: None,
            generation_results: Vec::new(),
            validation_results: Vec::new(),
            enriched: false,
            ranked: Vec::new(),
            synthesized_by: "Consensus".to_string(),
        }
    }

    /// Flattens recommendations across every generation result, successful
    /// or not (a failed `ProviderResult` always carries an empty list, so
    /// this needs no filtering).
    pub fn all_recommendations(&self) -> impl Iterator<Item = &Recommendation> {
        self.generation_results.iter().flat_map(|r| r.recommendations.iter())
    }

    #[must_use]
    pub fn successful_providers(&self) -> Vec<&ProviderResult> {
        self.generation_results
            .iter()
            .filter(|r| r.success && !r.recommendations.is_empty())
            .collect()
    }
}
