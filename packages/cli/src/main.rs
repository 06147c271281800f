#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the recommendation consensus pipeline.
//!
//! ```text
//! vicinity_cli --lat 43.4769 --lng -79.7596 --category restaurant
//! vicinity_cli --address "CN Tower, Toronto" --category museum --category park
//! ```
//!
//! Builds a [`vicinity_models::Request`] from the given flags, runs it
//! through the full [`vicinity_pipeline::Orchestrator`], and prints the
//! resulting `Response` (or error) as JSON, standing in for the HTTP
//! surface this workspace does not implement.

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use vicinity_cache::SqliteCacheStore;
use vicinity_geocoder::nominatim::NominatimGeocoder;
use vicinity_models::{Category, Request};
use vicinity_pipeline::{Orchestrator, PipelineError};
use vicinity_places::OverpassPlacesProvider;
use vicinity_providers::{create_providers_from_env, RequestContext};

#[derive(Parser)]
#[command(name = "vicinity_cli", about = "Run the recommendation consensus pipeline for one location")]
struct Cli {
    /// Latitude. Requires --lng. Mutually usable with --address.
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude. Requires --lat.
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,

    /// Free-text address, geocoded to coordinates when --lat/--lng are absent.
    #[arg(long)]
    address: Option<String>,

    /// Place category to request. May be repeated. Defaults to `all`.
    #[arg(long = "category", value_parser = parse_category)]
    categories: Vec<Category>,

    /// Maximum number of ranked recommendations to return.
    #[arg(long)]
    max_results: Option<u32>,

    /// Search radius in meters, used by the places-enrichment stage.
    #[arg(long)]
    radius_meters: Option<u32>,

    /// Bypass a cached response even if one is fresh.
    #[arg(long)]
    force_refresh: bool,

    /// Per-provider API key override, formatted `tag=key` (e.g. `anthropic=sk-...`).
    #[arg(long = "api-key", value_parser = parse_key_value)]
    api_keys: Vec<(String, String)>,
}

fn parse_category(s: &str) -> Result<Category, String> {
    let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
    Category::all()
        .iter()
        .copied()
        .find(|c| c.name().to_ascii_lowercase() == normalized)
        .ok_or_else(|| format!("unknown category: {s}"))
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(tag, key)| (tag.to_string(), key.to_string()))
        .ok_or_else(|| format!("expected tag=key, got: {s}"))
}

#[tokio::main]
async fn main() -> ExitCode {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let categories = if cli.categories.is_empty() { vec![Category::All] } else { cli.categories };

    let mut request = Request {
        lat: cli.lat,
        lng: cli.lng,
        address: cli.address,
        categories,
        force_refresh: cli.force_refresh,
        user_api_keys: cli.api_keys.into_iter().collect::<HashMap<_, _>>(),
        ..Request::default()
    };
    if let Some(max_results) = cli.max_results {
        request.max_results = max_results;
    }
    if let Some(radius_meters) = cli.radius_meters {
        request.radius_meters = radius_meters;
    }

    let orchestrator = match build_orchestrator().await {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            eprintln!("{{\"error\":\"failed to initialize pipeline: {e}\"}}");
            return ExitCode::FAILURE;
        }
    };

    let req_ctx = RequestContext::new(request.user_api_keys.clone());

    match orchestrator.run(request, &req_ctx).await {
        Ok(response) => {
            let json = serde_json::to_string_pretty(&response).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"));
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let (status, body) = match &e {
                PipelineError::InputInvalid(errors) => (400, serde_json::json!({ "errors": errors })),
                PipelineError::ExhaustedProviders => (503, serde_json::json!({ "error": e.to_string() })),
                PipelineError::Cancelled => (504, serde_json::json!({ "error": e.to_string() })),
                PipelineError::Internal(_) => (500, serde_json::json!({ "error": e.to_string() })),
            };
            log::error!("pipeline call failed with status {status}: {e}");
            eprintln!("{body}");
            ExitCode::FAILURE
        }
    }
}

async fn build_orchestrator() -> Result<Orchestrator, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    let providers = create_providers_from_env();
    let geocoder = Box::new(NominatimGeocoder::new(client.clone()));
    let places = Box::new(OverpassPlacesProvider::new(client));
    let cache = Arc::new(SqliteCacheStore::open_default().await?);

    Ok(Orchestrator::new(providers, geocoder, Some(places), cache))
}
