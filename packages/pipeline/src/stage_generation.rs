//! Stage 3 — ParallelGeneration (§4.4).

use std::time::Instant;

use futures::stream::{self, StreamExt as _};
use vicinity_models::{Category, ConfidenceLevel, ProviderResult, Recommendation};
use vicinity_parser::parse::parse_generation;
use vicinity_parser::prompts::generation_prompt;
use vicinity_providers::{LlmProvider, RequestContext};

use crate::context::PipelineContext;

/// Upper bound on simultaneous outbound provider calls for this stage.
const MAX_CONCURRENT_CALLS: usize = 8;

fn to_recommendation(candidate: vicinity_parser::GeneratedCandidate, category: Category, provider_name: &str) -> Recommendation {
    let base_confidence = vicinity_models::clamp01(candidate.confidence_score);
    Recommendation {
        name: candidate.name,
        description: candidate.description,
        category,
        base_confidence,
        level: ConfidenceLevel::for_score(base_confidence),
        address: candidate.address,
        lat: candidate.lat,
        lng: candidate.lng,
        source_provider: provider_name.to_string(),
        enriched_place: None,
        highlights: candidate.highlights,
        why_recommended: candidate.why_recommended,
        agreement_count: 1,
    }
}

pub async fn run(ctx: &mut PipelineContext, providers: &[Box<dyn LlmProvider>], req_ctx: &RequestContext, location: &str) {
    let available: Vec<&Box<dyn LlmProvider>> = providers.iter().filter(|p| p.is_available(req_ctx)).collect();

    let categories = ctx.request.categories.clone();
    // One call per provider covering every requested category, so
    // `providerName` identifies a provider exactly once per request:
    // `agreementCount` and `providersUsed`/`providersFailed` both key off it.
    let category = if let [single] = categories.as_slice() {
        *single
    } else {
        Category::All
    };

    let results: Vec<ProviderResult> = stream::iter(available.iter().map(|provider| {
        let prompt = generation_prompt(location, &categories);
        async move {
            let started = Instant::now();
            match provider.complete(&prompt, req_ctx).await {
                Ok(text) => {
                    let candidates = parse_generation(&text);
                    let recommendations: Vec<Recommendation> = candidates
                        .into_iter()
                        .map(|c| to_recommendation(c, category, provider.name()))
                        .collect();
                    let success = !recommendations.is_empty();
                    ProviderResult {
                        provider_name: provider.name().to_string(),
                        success,
                        error_message: if success {
                            None
                        } else {
                            Some("provider returned no parsable recommendations".to_string())
                        },
                        recommendations,
                        raw_response: Some(text),
                        elapsed: started.elapsed(),
                    }
                }
                Err(e) => ProviderResult::failure(provider.name(), e.to_string(), started.elapsed()),
            }
        }
    }))
    .buffer_unordered(MAX_CONCURRENT_CALLS)
    .collect()
    .await;

    ctx.generation_results = results;
}

#[cfg(test)]
mod tests {
    use super::*;
    use vicinity_parser::GeneratedCandidate;

    #[test]
    fn recommendation_confidence_is_clamped_before_leveling() {
        let candidate = GeneratedCandidate {
            name: "Joe's".to_string(),
            description: "d".to_string(),
            address: None,
            lat: None,
            lng: None,
            confidence_score: 1.5,
            highlights: vec![],
            why_recommended: None,
        };
        let rec = to_recommendation(candidate, Category::Restaurant, "anthropic");
        assert!((rec.base_confidence - 1.0).abs() < 1e-9);
        assert_eq!(rec.level, ConfidenceLevel::VeryHigh);
    }
}
