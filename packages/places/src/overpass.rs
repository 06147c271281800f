//! Overpass API (OpenStreetMap) backed [`PlacesProvider`].
//!
//! See <https://wiki.openstreetmap.org/wiki/Overpass_API>.

use async_trait::async_trait;
use serde::Deserialize;
use vicinity_models::{Category, Place};

use crate::distance::haversine_meters;
use crate::osm_tags::tags_for;
use crate::{PlacesError, PlacesProvider};

const DEFAULT_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

pub struct OverpassPlacesProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl OverpassPlacesProvider {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    #[must_use]
    pub fn with_endpoint(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

fn build_query(lat: f64, lng: f64, radius_meters: u32, category: Category) -> String {
    let mut clauses = String::new();
    for (key, value) in tags_for(category) {
        clauses.push_str(&format!(
            "node[\"{key}\"=\"{value}\"](around:{radius_meters},{lat},{lng});\
             way[\"{key}\"=\"{value}\"](around:{radius_meters},{lat},{lng});"
        ));
    }
    format!("[out:json][timeout:25];({clauses});out center tags;")
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<OverpassCenter>,
    #[serde(default)]
    tags: std::collections::HashMap<String, String>,
    #[serde(rename = "type")]
    kind: String,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct OverpassCenter {
    lat: f64,
    lon: f64,
}

impl OverpassElement {
    fn coordinates(&self) -> Option<(f64, f64)> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            return Some((lat, lon));
        }
        self.center.as_ref().map(|c| (c.lat, c.lon))
    }

    fn address(&self) -> Option<String> {
        let number = self.tags.get("addr:housenumber");
        let street = self.tags.get("addr:street");
        match (number, street) {
            (Some(n), Some(s)) => Some(format!("{n} {s}")),
            (None, Some(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl PlacesProvider for OverpassPlacesProvider {
    async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_meters: u32,
        category: Category,
        limit: usize,
    ) -> Result<Vec<Place>, PlacesError> {
        let query = build_query(lat, lng, radius_meters, category);

        let resp = self
            .client
            .post(&self.endpoint)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        let body: OverpassResponse = resp.json().await.map_err(|e| PlacesError::Parse {
            message: e.to_string(),
        })?;

        let mut places: Vec<Place> = body
            .elements
            .iter()
            .filter_map(|el| {
                let name = el.tags.get("name")?.clone();
                let (place_lat, place_lng) = el.coordinates()?;
                Some(Place {
                    name,
                    address: el.address(),
                    lat: place_lat,
                    lng: place_lng,
                    category,
                    rating: None,
                    user_ratings_total: None,
                    external_id: Some(format!("{}/{}", el.kind, el.id)),
                    phone: el.tags.get("phone").cloned(),
                    website: el.tags.get("website").cloned(),
                    distance_meters: haversine_meters(lat, lng, place_lat, place_lng),
                    is_verified_real_place: true,
                })
            })
            .collect();

        places.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
        places.truncate(limit);

        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_includes_every_mapped_tag_for_category() {
        let query = build_query(43.4769, -79.7596, 1000, Category::Restaurant);
        assert!(query.contains("\"amenity\"=\"restaurant\""));
        assert!(query.contains("around:1000,43.4769,-79.7596"));
    }

    #[test]
    fn element_address_prefers_house_number_and_street() {
        let mut tags = std::collections::HashMap::new();
        tags.insert("addr:housenumber".to_string(), "100".to_string());
        tags.insert("addr:street".to_string(), "Main St".to_string());
        let element = OverpassElement {
            lat: Some(43.0),
            lon: Some(-79.0),
            center: None,
            tags,
            kind: "node".to_string(),
            id: 1,
        };
        assert_eq!(element.address(), Some("100 Main St".to_string()));
    }

    #[test]
    fn way_element_uses_center_coordinates() {
        let element = OverpassElement {
            lat: None,
            lon: None,
            center: Some(OverpassCenter { lat: 43.1, lon: -79.1 }),
            tags: std::collections::HashMap::new(),
            kind: "way".to_string(),
            id: 2,
        };
        assert_eq!(element.coordinates(), Some((43.1, -79.1)));
    }
}
