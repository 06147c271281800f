//! Stage 8 — CacheWrite (§4.9).

use std::sync::Arc;
use std::time::Duration;

use rand::Rng as _;
use vicinity_cache::CacheStore;
use vicinity_models::Response;

/// Default time-to-live for a consolidated response.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// One write in fifty additionally triggers an expired-entry purge.
const PURGE_PROBABILITY: f64 = 1.0 / 50.0;

pub async fn run(cache_key: &str, response: &Response, cache: &Arc<dyn CacheStore>) {
    if let Err(e) = cache.upsert(cache_key, response, DEFAULT_TTL).await {
        log::warn!("cache write failed for key {cache_key}: {e}");
    }

    if rand::thread_rng().gen_bool(PURGE_PROBABILITY) {
        let cache = Arc::clone(cache);
        tokio::spawn(async move {
            match cache.delete_expired().await {
                Ok(count) => log::debug!("purged {count} expired cache entries"),
                Err(e) => log::warn!("expired-entry purge failed: {e}"),
            }
        });
    }
}
