//! Orchestrator (§4.1): wires the eight stages together over one
//! [`PipelineContext`] per request.

use std::sync::Arc;

use chrono::Utc;
use vicinity_cache::CacheStore;
use vicinity_geocoder::GeocodeProvider;
use vicinity_models::{Metadata, Request, Response};
use vicinity_places::PlacesProvider;
use vicinity_providers::{LlmProvider, RequestContext};

use crate::context::PipelineContext;
use crate::error::PipelineError;
use crate::{
    stage_cache_check, stage_cache_write, stage_consensus, stage_enrichment, stage_generation, stage_geocode, stage_synthesis,
    stage_validation,
};

/// Everything the pipeline needs to run a request: LLM adapters, the
/// geocoder, an optional places provider, and the cache store.
pub struct Orchestrator {
    providers: Vec<Box<dyn LlmProvider>>,
    geocoder: Box<dyn GeocodeProvider>,
    places: Option<Box<dyn PlacesProvider>>,
    cache: Arc<dyn CacheStore>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        providers: Vec<Box<dyn LlmProvider>>,
        geocoder: Box<dyn GeocodeProvider>,
        places: Option<Box<dyn PlacesProvider>>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        Self {
            providers,
            geocoder,
            places,
            cache,
        }
    }

    /// Runs the full eight-stage pipeline for one request.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InputInvalid`] if `request` fails
    /// validation, [`PipelineError::ExhaustedProviders`] if every LLM
    /// provider call fails or returns no recommendations, and
    /// [`PipelineError::Cancelled`] if `req_ctx`'s cancellation token fires
    /// before the response is assembled.
    pub async fn run(&self, request: Request, req_ctx: &RequestContext) -> Result<Response, PipelineError> {
        let started = std::time::Instant::now();

        let errors = request.validate();
        if !errors.is_empty() {
            return Err(PipelineError::InputInvalid(errors));
        }

        let mut ctx = PipelineContext::new(request);

        stage_geocode::run(&mut ctx, self.geocoder.as_ref()).await;

        if req_ctx.cancellation().is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        stage_cache_check::run(&mut ctx, self.cache.as_ref()).await;

        if ctx.cache_hit && !ctx.request.force_refresh {
            let mut response = ctx.cached_response.expect("cache_hit implies cached_response is set");
            response.from_cache = true;
            return Ok(response);
        }

        let location = ctx
            .resolved_address
            .clone()
            .unwrap_or_else(|| stage_geocode::format_coordinates(ctx.lat, ctx.lng));

        stage_generation::run(&mut ctx, &self.providers, req_ctx, &location).await;

        if req_ctx.cancellation().is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        if ctx.successful_providers().is_empty() {
            return Err(PipelineError::ExhaustedProviders);
        }

        stage_enrichment::run(&mut ctx, self.places.as_deref()).await;

        stage_validation::run(&mut ctx, &self.providers, req_ctx, &location).await;

        if req_ctx.cancellation().is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        stage_consensus::run(&mut ctx);

        stage_synthesis::run(&mut ctx, &self.providers, req_ctx).await;

        let total_candidates_evaluated = u32::try_from(ctx.all_recommendations().count()).unwrap_or(u32::MAX);

        let providers_used: Vec<String> = ctx
            .successful_providers()
            .into_iter()
            .map(|r| r.provider_name.clone())
            .collect();
        let providers_failed: Vec<String> = ctx
            .generation_results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.provider_name.clone())
            .collect();

        let response = Response {
            lat: ctx.lat,
            lng: ctx.lng,
            resolved_address: ctx.resolved_address.clone(),
            category: *ctx.request.categories.first().unwrap_or(&vicinity_models::Category::All),
            categories: ctx.request.categories.clone(),
            recommendations: ctx.ranked.clone(),
            metadata: Metadata {
                providers_used,
                providers_failed,
                enriched: ctx.enriched,
                total_candidates_evaluated,
                total_elapsed: started.elapsed(),
                synthesized_by: ctx.synthesized_by.clone(),
            },
            from_cache: false,
            generated_at: Utc::now(),
        };

        stage_cache_write::run(&ctx.cache_key, &response, &self.cache).await;

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use vicinity_cache::CacheError;
    use vicinity_geocoder::GeocodeError;
    use vicinity_providers::ProviderError;

    use super::*;

    struct FixedGeocoder;

    #[async_trait]
    impl GeocodeProvider for FixedGeocoder {
        async fn forward(&self, _address: &str) -> Result<Option<vicinity_geocoder::GeocodedAddress>, GeocodeError> {
            Ok(None)
        }

        async fn reverse(&self, _lat: f64, _lng: f64) -> Result<Option<String>, GeocodeError> {
            Ok(Some("Toronto, ON".to_string()))
        }
    }

    struct ScriptedProvider {
        tag: &'static str,
        reply: String,
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            self.tag
        }

        fn is_available(&self, _ctx: &RequestContext) -> bool {
            true
        }

        async fn complete(&self, _prompt: &str, _ctx: &RequestContext) -> Result<String, ProviderError> {
            Ok(self.reply.clone())
        }
    }

    #[derive(Default)]
    struct InMemoryCache {
        entries: Mutex<HashMap<String, Response>>,
    }

    #[async_trait]
    impl CacheStore for InMemoryCache {
        async fn get(&self, key: &str) -> Result<Option<Response>, CacheError> {
            Ok(self.entries.lock().expect("lock poisoned").get(key).cloned())
        }

        async fn upsert(&self, key: &str, response: &Response, _ttl: std::time::Duration) -> Result<(), CacheError> {
            self.entries
                .lock()
                .expect("lock poisoned")
                .insert(key.to_string(), response.clone());
            Ok(())
        }

        async fn delete_expired(&self) -> Result<u64, CacheError> {
            Ok(0)
        }

        async fn stats(&self) -> Result<vicinity_cache::CacheStats, CacheError> {
            Ok(vicinity_cache::CacheStats {
                count: self.entries.lock().expect("lock poisoned").len() as u64,
                earliest_created_at: None,
                latest_created_at: None,
            })
        }
    }

    fn reply_with_two_recommendations() -> String {
        r#"{"recommendations":[
            {"name":"Joe's Diner","description":"Classic diner","confidenceScore":0.8,
             "highlights":["cozy"],"whyRecommended":"great coffee"},
            {"name":"Luna Cafe","description":"Bright cafe","confidenceScore":0.6,
             "highlights":["quiet"],"whyRecommended":"good wifi"}
        ]}"#
        .to_string()
    }

    #[tokio::test]
    async fn runs_end_to_end_and_writes_to_cache() {
        let providers: Vec<Box<dyn LlmProvider>> = vec![Box::new(ScriptedProvider {
            tag: "anthropic",
            reply: reply_with_two_recommendations(),
        })];
        let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCache::default());
        let orchestrator = Orchestrator::new(providers, Box::new(FixedGeocoder), None, Arc::clone(&cache));

        let request = Request {
            lat: Some(43.4769),
            lng: Some(-79.7596),
            ..Request::default()
        };
        let req_ctx = RequestContext::default();

        let response = orchestrator.run(request, &req_ctx).await.expect("pipeline succeeds");

        assert!(!response.from_cache);
        assert_eq!(response.recommendations.len(), 2);
        assert!(cache.stats().await.expect("stats available").count >= 1);
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let providers: Vec<Box<dyn LlmProvider>> = vec![Box::new(ScriptedProvider {
            tag: "anthropic",
            reply: reply_with_two_recommendations(),
        })];
        let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCache::default());
        let orchestrator = Orchestrator::new(providers, Box::new(FixedGeocoder), None, Arc::clone(&cache));

        let request = Request {
            lat: Some(43.4769),
            lng: Some(-79.7596),
            ..Request::default()
        };
        let req_ctx = RequestContext::default();

        orchestrator.run(request.clone(), &req_ctx).await.expect("first call succeeds");
        let second = orchestrator.run(request, &req_ctx).await.expect("second call succeeds");

        assert!(second.from_cache);
    }

    #[tokio::test]
    async fn invalid_request_is_rejected_before_any_network_call() {
        let orchestrator = Orchestrator::new(Vec::new(), Box::new(FixedGeocoder), None, Arc::new(InMemoryCache::default()));
        let req_ctx = RequestContext::default();

        let result = orchestrator.run(Request::default(), &req_ctx).await;

        assert!(matches!(result, Err(PipelineError::InputInvalid(_))));
    }

    #[tokio::test]
    async fn no_providers_is_exhausted_providers_error() {
        let orchestrator = Orchestrator::new(Vec::new(), Box::new(FixedGeocoder), None, Arc::new(InMemoryCache::default()));
        let req_ctx = RequestContext::default();
        let request = Request {
            lat: Some(0.0),
            lng: Some(0.0),
            ..Request::default()
        };

        let result = orchestrator.run(request, &req_ctx).await;

        assert!(matches!(result, Err(PipelineError::ExhaustedProviders)));
    }
}
