//! Stage 7 — Synthesis (§4.8).

use vicinity_parser::parse::parse_synthesis;
use vicinity_parser::prompts::synthesis_prompt;
use vicinity_providers::{LlmProvider, RequestContext};

use crate::context::PipelineContext;

const CONSENSUS_PROVIDER_NAME: &str = "Consensus";

pub async fn run(ctx: &mut PipelineContext, providers: &[Box<dyn LlmProvider>], req_ctx: &RequestContext) {
    ctx.synthesized_by = CONSENSUS_PROVIDER_NAME.to_string();

    if ctx.ranked.is_empty() {
        return;
    }

    let fastest = ctx.generation_results.iter().filter(|r| r.success).min_by_key(|r| {
        let provider_index = providers
            .iter()
            .position(|p| p.name() == r.provider_name)
            .unwrap_or(usize::MAX);
        (r.elapsed, provider_index)
    });

    let Some(fastest) = fastest else {
        return;
    };

    let Some(provider) = providers
        .iter()
        .find(|p| p.name() == fastest.provider_name && p.is_available(req_ctx))
    else {
        return;
    };

    let prompt = synthesis_prompt(&ctx.ranked);

    let text = match provider.complete(&prompt, req_ctx).await {
        Ok(text) => text,
        Err(e) => {
            log::debug!("synthesis call to {} failed, leaving ranked list untouched: {e}", provider.name());
            return;
        }
    };

    let synthesized = parse_synthesis(&text);
    if synthesized.is_empty() {
        return;
    }

    for rec in &mut ctx.ranked {
        if let Some(entry) = synthesized.iter().find(|e| e.name.eq_ignore_ascii_case(&rec.name)) {
            // A synthesizer that drops a field under load shedding must not blank it out;
            // the original value (from consensus scoring) is kept instead.
            if !entry.description.is_empty() {
                rec.description = entry.description.clone();
            }
            if !entry.highlights.is_empty() {
                rec.highlights = entry.highlights.clone();
            }
            if !entry.why_recommended.is_empty() {
                rec.why_recommended = Some(entry.why_recommended.clone());
            }
        }
        rec.source_provider = CONSENSUS_PROVIDER_NAME.to_string();
    }
}
