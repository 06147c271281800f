//! Stage 4 — PlacesEnrichment (§4.5).

use vicinity_parser::normalize::{normalize_name, substring_match, word_overlap};
use vicinity_places::PlacesProvider;

use crate::context::PipelineContext;

const FETCH_LIMIT: usize = 20;
const WORD_OVERLAP_THRESHOLD: f64 = 0.6;

pub async fn run(ctx: &mut PipelineContext, places: Option<&dyn PlacesProvider>) {
    let Some(places) = places else {
        ctx.enriched = false;
        return;
    };

    if !ctx.geocoding_available {
        ctx.enriched = false;
        return;
    }

    // Only the first requested category is searched even when several were given;
    // pass `All` explicitly for a multi-type union.
    let category = *ctx.request.categories.first().unwrap_or(&vicinity_models::Category::All);

    let nearby = match places
        .nearby(ctx.lat, ctx.lng, ctx.request.radius_meters, category, FETCH_LIMIT)
        .await
    {
        Ok(places) => places,
        Err(e) => {
            log::warn!("places enrichment failed, continuing without it: {e}");
            ctx.enriched = false;
            return;
        }
    };

    if nearby.is_empty() {
        ctx.enriched = false;
        return;
    }

    let normalized_places: Vec<(String, usize)> = nearby
        .iter()
        .enumerate()
        .map(|(i, place)| (normalize_name(&place.name), i))
        .collect();

    for result in &mut ctx.generation_results {
        for rec in &mut result.recommendations {
            let normalized_rec = normalize_name(&rec.name);

            let best = normalized_places
                .iter()
                .find(|(name, _)| *name == normalized_rec)
                .or_else(|| normalized_places.iter().find(|(name, _)| substring_match(&normalized_rec, name)))
                .or_else(|| {
                    normalized_places
                        .iter()
                        .find(|(name, _)| word_overlap(&normalized_rec, name) >= WORD_OVERLAP_THRESHOLD)
                });

            if let Some((_, idx)) = best {
                rec.enriched_place = Some(nearby[*idx].clone());
            }
        }
    }

    ctx.enriched = true;
}
