#![cfg_attr(all(not(test), feature = "fail-on-warnings"), deny(warnings))]

//! Nearby real-world places lookup (§4.5) used to enrich LLM-generated
//! recommendations with grounded addresses and coordinates.

pub mod distance;
pub mod osm_tags;
pub mod overpass;

use async_trait::async_trait;
use thiserror::Error;
use vicinity_models::{Category, Place};

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response parse error: {message}")]
    Parse { message: String },
}

/// Source of nearby real-world places, used to attach grounded addresses
/// and coordinates to LLM-generated recommendations.
#[async_trait]
pub trait PlacesProvider: Send + Sync {
    /// Fetches up to `limit` real places within `radius_meters` of
    /// `(lat, lng)` matching `category`. `Category::All` is a multi-type
    /// union across every mapped OSM tag.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError`] on a request or parse failure.
    async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_meters: u32,
        category: Category,
        limit: usize,
    ) -> Result<Vec<Place>, PlacesError>;
}

pub use distance::haversine_meters;
pub use overpass::OverpassPlacesProvider;
