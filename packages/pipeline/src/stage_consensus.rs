//! Stage 6 — ConsensusScoring (§4.7). Pure: no I/O, a single fold over
//! everything stages 3–5 accumulated.

use std::collections::HashSet;

use vicinity_models::{clamp01, ConfidenceLevel, Recommendation};
use vicinity_parser::normalize::normalize_name;

use crate::context::PipelineContext;

const AGREEMENT_BONUS_STEP: f64 = 0.05;
const AGREEMENT_BONUS_CAP: f64 = 0.20;
const INACCURATE_PENALTY: f64 = 0.20;
const OUT_OF_RANGE_PENALTY: f64 = 0.30;
const REAL_PLACE_BONUS: f64 = 0.15;
const RATING_BONUS_WEIGHT: f64 = 0.05;
const BASE_SCORE_WEIGHT: f64 = 0.4;
const VALIDATION_SCORE_WEIGHT: f64 = 0.35;
const MAX_HIGHLIGHTS: usize = 5;

fn round_to_three_decimals(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

fn merge_highlights(group: &[&Recommendation]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for rec in group {
        for highlight in &rec.highlights {
            if seen.insert(highlight.to_lowercase()) {
                merged.push(highlight.clone());
                if merged.len() == MAX_HIGHLIGHTS {
                    return merged;
                }
            }
        }
    }
    merged
}

pub fn run(ctx: &mut PipelineContext) {
    let all: Vec<&Recommendation> = ctx.all_recommendations().collect();

    let mut groups: Vec<(String, Vec<&Recommendation>)> = Vec::new();
    for rec in &all {
        let key = normalize_name(&rec.name);
        if let Some(group) = groups.iter_mut().find(|(k, _)| *k == key) {
            group.1.push(rec);
        } else {
            groups.push((key, vec![rec]));
        }
    }

    let mut scored: Vec<Recommendation> = groups
        .into_iter()
        .map(|(key, group)| score_group(ctx, &key, &group))
        .collect();

    scored.sort_by(|a, b| {
        b.base_confidence
            .total_cmp(&a.base_confidence)
            .then_with(|| b.agreement_count.cmp(&a.agreement_count))
    });

    scored.truncate(ctx.request.max_results as usize);
    ctx.ranked = scored;
}

fn score_group(ctx: &PipelineContext, key: &str, group: &[&Recommendation]) -> Recommendation {
    let representative = group
        .iter()
        .copied()
        .reduce(|best, candidate| {
            if candidate.base_confidence > best.base_confidence {
                candidate
            } else {
                best
            }
        })
        .expect("group is never empty");

    let base_score = group.iter().map(|r| r.base_confidence).sum::<f64>() / group.len() as f64;
    // Distinct providers, not raw candidate count: one provider mentioning a
    // place twice is not two providers agreeing on it.
    let distinct_providers: HashSet<&str> = group.iter().map(|r| r.source_provider.as_str()).collect();
    let agreement_count = u32::try_from(distinct_providers.len()).unwrap_or(u32::MAX);
    let agreement_bonus = (f64::from(agreement_count.saturating_sub(1)) * AGREEMENT_BONUS_STEP).min(AGREEMENT_BONUS_CAP);

    let entries: Vec<_> = ctx
        .validation_results
        .iter()
        .flat_map(|r| r.items.iter())
        .filter(|entry| normalize_name(&entry.original.name) == key)
        .collect();

    let validation_score = if entries.is_empty() {
        base_score
    } else {
        entries.iter().map(|e| e.validation_score).sum::<f64>() / entries.len() as f64
    };

    let flagged_inaccurate = entries.iter().filter(|e| e.flagged_inaccurate).count();
    let flagged_out_of_range = entries.iter().filter(|e| e.flagged_out_of_range).count();
    let flag_penalty = INACCURATE_PENALTY * flagged_inaccurate as f64 + OUT_OF_RANGE_PENALTY * flagged_out_of_range as f64;

    let real_place_bonus = representative
        .enriched_place
        .as_ref()
        .is_some_and(|p| p.is_verified_real_place)
        .then_some(REAL_PLACE_BONUS)
        .unwrap_or(0.0);

    let rating_bonus = representative
        .enriched_place
        .as_ref()
        .and_then(|p| p.rating)
        .map_or(0.0, |rating| RATING_BONUS_WEIGHT * (rating / 5.0));

    let final_score = round_to_three_decimals(clamp01(
        base_score * BASE_SCORE_WEIGHT + validation_score * VALIDATION_SCORE_WEIGHT + agreement_bonus + real_place_bonus
            + rating_bonus
            - flag_penalty,
    ));

    let description = representative.description.clone();

    let why_recommended = group.iter().find_map(|r| r.why_recommended.clone().filter(|w| !w.is_empty()));

    Recommendation {
        name: representative.name.clone(),
        description,
        category: representative.category,
        base_confidence: final_score,
        level: ConfidenceLevel::for_score(final_score),
        address: representative.address.clone(),
        lat: representative.lat,
        lng: representative.lng,
        source_provider: representative.source_provider.clone(),
        enriched_place: representative.enriched_place.clone(),
        highlights: merge_highlights(group),
        why_recommended,
        agreement_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vicinity_models::{Category, Place, Request};

    fn recommendation(name: &str, confidence: f64, provider: &str) -> Recommendation {
        Recommendation {
            name: name.to_string(),
            description: format!("{name} description"),
            category: Category::Restaurant,
            base_confidence: confidence,
            level: ConfidenceLevel::for_score(confidence),
            address: None,
            lat: None,
            lng: None,
            source_provider: provider.to_string(),
            enriched_place: None,
            highlights: vec!["cozy".to_string()],
            why_recommended: Some("great food".to_string()),
            agreement_count: 1,
        }
    }

    #[test]
    fn agreeing_providers_increase_agreement_bonus() {
        let mut ctx = PipelineContext::new(Request {
            lat: Some(0.0),
            lng: Some(0.0),
            ..Request::default()
        });
        ctx.generation_results.push(vicinity_models::ProviderResult {
            provider_name: "anthropic".to_string(),
            success: true,
            error_message: None,
            recommendations: vec![recommendation("Joe's Diner", 0.8, "anthropic")],
            raw_response: None,
            elapsed: std::time::Duration::from_millis(100),
        });
        ctx.generation_results.push(vicinity_models::ProviderResult {
            provider_name: "openai".to_string(),
            success: true,
            error_message: None,
            recommendations: vec![recommendation("joes diner", 0.6, "openai")],
            raw_response: None,
            elapsed: std::time::Duration::from_millis(150),
        });

        run(&mut ctx);

        assert_eq!(ctx.ranked.len(), 1);
        assert_eq!(ctx.ranked[0].agreement_count, 2);
        assert!(ctx.ranked[0].base_confidence > 0.7 * BASE_SCORE_WEIGHT);
    }

    #[test]
    fn verified_real_place_adds_bonus() {
        let mut with_place = recommendation("Cafe Luna", 0.5, "anthropic");
        with_place.enriched_place = Some(Place {
            name: "Cafe Luna".to_string(),
            address: None,
            lat: 0.0,
            lng: 0.0,
            category: Category::Cafe,
            rating: None,
            user_ratings_total: None,
            external_id: None,
            phone: None,
            website: None,
            distance_meters: 10.0,
            is_verified_real_place: true,
        });

        let mut ctx = PipelineContext::new(Request::default());
        ctx.generation_results.push(vicinity_models::ProviderResult {
            provider_name: "anthropic".to_string(),
            success: true,
            error_message: None,
            recommendations: vec![with_place],
            raw_response: None,
            elapsed: std::time::Duration::from_millis(100),
        });

        run(&mut ctx);

        assert_eq!(ctx.ranked.len(), 1);
        assert!(ctx.ranked[0].enriched_place.is_some());
    }

    #[test]
    fn result_never_exceeds_max_results() {
        let mut ctx = PipelineContext::new(Request {
            lat: Some(0.0),
            lng: Some(0.0),
            max_results: 1,
            ..Request::default()
        });
        ctx.generation_results.push(vicinity_models::ProviderResult {
            provider_name: "anthropic".to_string(),
            success: true,
            error_message: None,
            recommendations: vec![recommendation("A", 0.9, "anthropic"), recommendation("B", 0.5, "anthropic")],
            raw_response: None,
            elapsed: std::time::Duration::from_millis(100),
        });

        run(&mut ctx);

        assert_eq!(ctx.ranked.len(), 1);
        assert_eq!(ctx.ranked[0].name, "A");
    }
}
