//! Canonical cache-key construction (§4.3, bit-exact).
//!
//! Coordinate mode: `rec:v1:{lat}:{lng}:{catPart}` with `lat`/`lng` rounded
//! to 3 decimals, half-away-from-zero, formatted with exactly three
//! fraction digits. Address mode: `rec:v1:addr:{h}:{cat}` where `h` is the
//! first 16 uppercase hex characters of the SHA-256 of the lower-cased,
//! trimmed address.

use sha2::{Digest, Sha256};
use vicinity_models::Category;

const KEY_PREFIX: &str = "rec:v1";

/// Rounds `value` to 3 decimal places using half-away-from-zero and formats
/// it with exactly three fraction digits, independent of locale.
///
/// `format!("{:.3}", ...)` already rounds half-away-from-zero for `f64` in
/// Rust, but we scale-and-round through `i64` first so the *displayed*
/// value is guaranteed to be the same one compared for cache-key
/// idempotence, rather than trusting two separate floating point rounding
/// paths to agree.
#[must_use]
pub fn format_grid_coordinate(value: f64) -> String {
    let scaled = (value * 1000.0).round();
    #[allow(clippy::cast_possible_truncation)]
    let thousandths = scaled as i64;

    let sign = if thousandths < 0 { "-" } else { "" };
    let magnitude = thousandths.unsigned_abs();
    let whole = magnitude / 1000;
    let frac = magnitude % 1000;

    format!("{sign}{whole}.{frac:03}")
}

fn category_part(categories: &[Category]) -> String {
    if categories.len() <= 1 {
        return categories.first().copied().unwrap_or_default().name();
    }
    let mut names: Vec<String> = categories.iter().map(|c| c.name()).collect();
    names.sort();
    names.join("+")
}

/// Builds the coordinate-mode cache key.
#[must_use]
pub fn build_coordinate_key(lat: f64, lng: f64, categories: &[Category]) -> String {
    format!(
        "{KEY_PREFIX}:{}:{}:{}",
        format_grid_coordinate(lat),
        format_grid_coordinate(lng),
        category_part(categories)
    )
}

/// Builds the address-fallback cache key used when geocoding is
/// unavailable. `cat` is the single category name, or `All` for a
/// multi-category request.
#[must_use]
pub fn build_address_key(address: &str, categories: &[Category]) -> String {
    let normalized = address.to_lowercase();
    let normalized = normalized.trim();
    let digest = Sha256::digest(normalized.as_bytes());
    let full_hex = hex::encode_upper(digest);
    let h = &full_hex[..16];

    let cat = if categories.len() == 1 {
        categories[0].name()
    } else {
        Category::All.name()
    };

    format!("{KEY_PREFIX}:addr:{h}:{cat}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_key_matches_documented_format() {
        let key = build_coordinate_key(43.4769, -79.7596, &[Category::Restaurant]);
        assert_eq!(key, "rec:v1:43.477:-79.760:Restaurant");
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(format_grid_coordinate(43.4765), "43.477");
        assert_eq!(format_grid_coordinate(-79.7595), "-79.760");
        assert_eq!(format_grid_coordinate(0.0005), "0.001");
        assert_eq!(format_grid_coordinate(-0.0005), "-0.001");
    }

    #[test]
    fn key_is_idempotent() {
        let cats = [Category::Cafe];
        assert_eq!(
            build_coordinate_key(43.4769, -79.7596, &cats),
            build_coordinate_key(43.4769, -79.7596, &cats)
        );
    }

    #[test]
    fn nearby_coordinates_rounding_to_same_cell_collide() {
        let cats = [Category::Cafe];
        let a = build_coordinate_key(43.47695, -79.75955, &cats);
        let b = build_coordinate_key(43.476951, -79.759549, &cats);
        assert_eq!(a, b);
    }

    #[test]
    fn category_ordering_does_not_affect_key() {
        let a = build_coordinate_key(43.0, -79.0, &[Category::Restaurant, Category::Cafe]);
        let b = build_coordinate_key(43.0, -79.0, &[Category::Cafe, Category::Restaurant]);
        assert_eq!(a, b);
    }

    #[test]
    fn address_key_matches_sha256_prefix() {
        let key = build_address_key("Nowhereville", &[Category::All]);
        let expected_hash = hex::encode_upper(Sha256::digest(b"nowhereville"));
        assert_eq!(key, format!("rec:v1:addr:{}:All", &expected_hash[..16]));
    }

    #[test]
    fn address_key_trims_and_lowercases_before_hashing() {
        let a = build_address_key("  Nowhereville  ", &[Category::All]);
        let b = build_address_key("nowhereville", &[Category::All]);
        assert_eq!(a, b);
    }
}
