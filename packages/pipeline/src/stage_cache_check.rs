//! Stage 2 — CacheCheck (§4.3).

use vicinity_cache::{build_address_key, build_coordinate_key, CacheStore};

use crate::context::PipelineContext;

pub async fn run(ctx: &mut PipelineContext, cache: &dyn CacheStore) {
    ctx.cache_key = if ctx.geocoding_available {
        build_coordinate_key(ctx.lat, ctx.lng, &ctx.request.categories)
    } else {
        let address = ctx.request.address.as_deref().unwrap_or_default();
        build_address_key(address, &ctx.request.categories)
    };

    if ctx.request.force_refresh {
        return;
    }

    match cache.get(&ctx.cache_key).await {
        Ok(Some(response)) => {
            ctx.cache_hit = true;
            ctx.cached_response = Some(response);
        }
        Ok(None) => {}
        Err(e) => log::warn!("cache lookup failed for key {}: {e}", ctx.cache_key),
    }
}
