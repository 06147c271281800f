#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address/coordinate resolution (§4.2): forward-geocodes a free-text
//! address to coordinates, or reverse-geocodes coordinates to a display
//! name, via Nominatim / OpenStreetMap.

pub mod nominatim;

use async_trait::async_trait;
use thiserror::Error;

/// Forward/reverse address resolution, the sole external geocoding
/// dependency of the orchestrator (§4.2).
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Resolves a free-text address to coordinates plus a canonical
    /// display name.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on a request or parse failure. Returns
    /// `Ok(None)` when the provider has no match (not an error).
    async fn forward(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError>;

    /// Resolves coordinates to a display name. Absence of a name is not an
    /// error — callers fall back to a formatted coordinate string.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on a request or parse failure.
    async fn reverse(&self, lat: f64, lng: f64) -> Result<Option<String>, GeocodeError>;
}

/// A geocoding result with coordinates and metadata.
#[derive(Debug, Clone)]
pub struct GeocodedAddress {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// The matched/canonical address returned by the geocoder.
    pub matched_address: Option<String>,
    /// Which provider resolved this address.
    pub provider: GeocodingProvider,
    /// Whether this was an exact or approximate match.
    pub match_quality: MatchQuality,
}

/// Which geocoding provider resolved an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingProvider {
    /// Nominatim / OpenStreetMap.
    Nominatim,
}

/// Quality of the geocoding match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchQuality {
    /// Exact address match.
    Exact,
    /// Approximate / non-exact match.
    Approximate,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}
