//! Stage 5 — CrossValidation (§4.6).

use futures::stream::{self, StreamExt as _};
use vicinity_models::{CrossValidationResult, ValidationEntry};
use vicinity_parser::normalize::normalize_name;
use vicinity_parser::parse::parse_validation;
use vicinity_parser::prompts::validation_prompt;
use vicinity_providers::{LlmProvider, RequestContext};

use crate::context::PipelineContext;

const MAX_CONCURRENT_PAIRS: usize = 8;
const MINIMUM_SUCCESSFUL_PROVIDERS: usize = 2;

pub async fn run(ctx: &mut PipelineContext, providers: &[Box<dyn LlmProvider>], req_ctx: &RequestContext, location: &str) {
    let successful: Vec<(String, Vec<vicinity_models::Recommendation>)> = ctx
        .successful_providers()
        .into_iter()
        .map(|r| (r.provider_name.clone(), r.recommendations.clone()))
        .collect();

    if successful.len() < MINIMUM_SUCCESSFUL_PROVIDERS {
        return;
    }

    let available: Vec<&Box<dyn LlmProvider>> = providers.iter().filter(|p| p.is_available(req_ctx)).collect();

    let pairs: Vec<(&Box<dyn LlmProvider>, &(String, Vec<vicinity_models::Recommendation>))> = available
        .iter()
        .flat_map(|validator| {
            successful
                .iter()
                .filter(move |(source_name, recs)| validator.name() != source_name && !recs.is_empty())
                .map(move |source| (*validator, source))
        })
        .collect();

    let results: Vec<CrossValidationResult> = stream::iter(pairs.into_iter().map(|(validator, (source_name, recs))| async move {
        let prompt = validation_prompt(location, recs);
        match validator.complete(&prompt, req_ctx).await {
            Ok(text) => {
                let parsed = parse_validation(&text);
                let items: Vec<ValidationEntry> = parsed
                    .into_iter()
                    .filter_map(|item| {
                        let normalized = normalize_name(&item.name);
                        let original = recs.iter().find(|r| normalize_name(&r.name) == normalized)?.clone();
                        Some(ValidationEntry {
                            original,
                            validation_score: vicinity_models::clamp01(item.validation_score),
                            flagged_inaccurate: item.flagged_as_inaccurate,
                            flagged_out_of_range: item.flagged_as_out_of_range,
                            comment: item.comment,
                        })
                    })
                    .collect();
                CrossValidationResult {
                    validated_by: validator.name().to_string(),
                    original_source: source_name.clone(),
                    items,
                }
            }
            Err(e) => {
                log::debug!("cross-validation pair {}/{source_name} failed: {e}", validator.name());
                CrossValidationResult::empty(validator.name(), source_name.clone())
            }
        }
    }))
    .buffer_unordered(MAX_CONCURRENT_PAIRS)
    .collect()
    .await;

    ctx.validation_results = results;
}
