//! Stage 1 — Geocode (§4.2).

use vicinity_geocoder::GeocodeProvider;

use crate::context::PipelineContext;

/// Formats a coordinate pair as a human-readable fallback location string
/// when no display name is available.
#[must_use]
pub fn format_coordinates(lat: f64, lng: f64) -> String {
    format!("{lat:.4}, {lng:.4}")
}

pub async fn run(ctx: &mut PipelineContext, geocoder: &dyn GeocodeProvider) {
    if ctx.request.has_coordinates() {
        let lat = ctx.request.lat.expect("checked by has_coordinates");
        let lng = ctx.request.lng.expect("checked by has_coordinates");
        ctx.lat = lat;
        ctx.lng = lng;
        ctx.geocoding_available = true;

        match geocoder.reverse(lat, lng).await {
            Ok(Some(name)) => ctx.resolved_address = Some(name),
            Ok(None) => ctx.resolved_address = Some(format_coordinates(lat, lng)),
            Err(e) => {
                log::debug!("reverse geocoding failed, falling back to coordinate string: {e}");
                ctx.resolved_address = Some(format_coordinates(lat, lng));
            }
        }
        return;
    }

    let address = ctx.request.address.clone().unwrap_or_default();
    match geocoder.forward(&address).await {
        Ok(Some(result)) => {
            ctx.lat = result.latitude;
            ctx.lng = result.longitude;
            ctx.resolved_address = result.matched_address.or(Some(address));
            ctx.geocoding_available = true;
        }
        Ok(None) => {
            log::warn!("geocoder found no match for address");
            ctx.geocoding_available = false;
            ctx.lat = 0.0;
            ctx.lng = 0.0;
            ctx.resolved_address = Some(address);
        }
        Err(e) => {
            log::warn!("geocoding failed, degrading to address-only mode: {e}");
            ctx.geocoding_available = false;
            ctx.lat = 0.0;
            ctx.lng = 0.0;
            ctx.resolved_address = Some(address);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_four_fraction_digits() {
        assert_eq!(format_coordinates(43.4769, -79.7596), "43.4769, -79.7596");
    }
}
