//! Nominatim / OpenStreetMap geocoder client.
//!
//! Nominatim has strict rate limits: **1 request per second** maximum for
//! the public instance.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/> and
//! <https://nominatim.org/release-docs/develop/api/Reverse/>

use async_trait::async_trait;

use crate::{GeocodeError, GeocodeProvider, GeocodedAddress, GeocodingProvider, MatchQuality};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";
const DEFAULT_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// [`GeocodeProvider`] backed by the Nominatim search/reverse endpoints.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    search_url: String,
    reverse_url: String,
}

impl NominatimGeocoder {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            search_url: DEFAULT_BASE_URL.to_string(),
            reverse_url: DEFAULT_REVERSE_URL.to_string(),
        }
    }
}

#[async_trait]
impl GeocodeProvider for NominatimGeocoder {
    async fn forward(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        geocode_freeform(&self.client, &self.search_url, address).await
    }

    async fn reverse(&self, lat: f64, lng: f64) -> Result<Option<String>, GeocodeError> {
        reverse_geocode(&self.client, &self.reverse_url, lat, lng).await
    }
}

/// Reverse-geocodes `(lat, lng)` to a display name.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn reverse_geocode(
    client: &reqwest::Client,
    base_url: &str,
    lat: f64,
    lng: f64,
) -> Result<Option<String>, GeocodeError> {
    let resp = client
        .get(base_url)
        .query(&[
            ("lat", lat.to_string()),
            ("lon", lng.to_string()),
            ("format", "jsonv2".to_string()),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let body: serde_json::Value = resp.json().await?;
    Ok(body.get("display_name").and_then(|v| v.as_str()).map(String::from))
}

/// Geocodes a free-form query (address, intersection, or place name) using
/// Nominatim. Unrestricted by country; the resolved location drives the
/// rest of the pipeline so this must accept addresses anywhere.
///
/// The caller is responsible for rate limiting (see `rate_limit_ms` in the
/// service TOML configuration).
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn geocode_freeform(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let resp = client
        .get(base_url)
        .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    let display_name = first["display_name"].as_str().map(String::from);

    Ok(Some(GeocodedAddress {
        latitude: lat,
        longitude: lon,
        matched_address: display_name,
        provider: GeocodingProvider::Nominatim,
        match_quality: MatchQuality::Approximate,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nominatim_result() {
        let body = serde_json::json!([{
            "lat": "41.8827",
            "lon": "-87.6278",
            "display_name": "100, North State Street, Chicago, IL, USA"
        }]);
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.latitude - 41.8827).abs() < 1e-4);
        assert!((result.longitude - -87.6278).abs() < 1e-4);
        assert_eq!(result.provider, GeocodingProvider::Nominatim);
    }

    #[test]
    fn parses_nominatim_empty() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn reverse_geocode_reads_display_name_field() {
        let body = serde_json::json!({
            "display_name": "100, North State Street, Chicago, IL, USA"
        });
        let name = body.get("display_name").and_then(|v| v.as_str()).map(String::from);
        assert_eq!(name, Some("100, North State Street, Chicago, IL, USA".to_string()));
    }
}
