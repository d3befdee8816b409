// ── API-to-domain type conversions ──
//
// Bridges raw `aoi_api` geocoder places into `SearchResult`. Nominatim
// sends coordinates and extents as decimal strings; they are parsed here
// so nothing downstream ever sees them.

use aoi_api::Place;

use crate::error::CoreError;
use crate::model::{BoundingBox, LatLng, SearchResult};

// ── Helpers ────────────────────────────────────────────────────────

fn parse_degrees(raw: &str, field: &str) -> Result<f64, CoreError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CoreError::Geocoder {
            message: format!("invalid {field} value {raw:?}"),
            status: None,
        })
}

/// Nominatim orders the box `[south, north, west, east]`. Unparseable
/// boxes are dropped rather than failing the whole result.
fn parse_bounds(raw: &[String; 4]) -> Option<BoundingBox> {
    let [south, north, west, east] = raw;
    Some(BoundingBox {
        west: west.trim().parse().ok()?,
        south: south.trim().parse().ok()?,
        east: east.trim().parse().ok()?,
        north: north.trim().parse().ok()?,
    })
}

// ── Place ──────────────────────────────────────────────────────────

impl TryFrom<Place> for SearchResult {
    type Error = CoreError;

    fn try_from(place: Place) -> Result<Self, Self::Error> {
        let lat = parse_degrees(&place.lat, "lat")?;
        let lng = parse_degrees(&place.lon, "lon")?;

        Ok(Self {
            place_id: place.place_id,
            bounds: place.boundingbox.as_ref().and_then(parse_bounds),
            display_name: place.display_name,
            location: LatLng::new(lat, lng),
            class: place.class,
            kind: place.kind,
            importance: place.importance,
        })
    }
}

/// Convert a batch of places, skipping entries with unusable coordinates.
pub fn search_results(places: Vec<Place>) -> Vec<SearchResult> {
    places
        .into_iter()
        .filter_map(|place| {
            let place_id = place.place_id;
            SearchResult::try_from(place)
                .inspect_err(|e| tracing::debug!(place_id, error = %e, "skipping geocoder result"))
                .ok()
        })
        .collect()
}
