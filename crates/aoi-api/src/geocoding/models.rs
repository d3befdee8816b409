// Raw geocoder response types.
//
// Field names follow the Nominatim `format=json` output. Coordinates and
// bounding boxes arrive as strings; `aoi-core` parses them into typed
// domain values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single place returned by `/search` or `/reverse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub place_id: u64,
    #[serde(default)]
    pub licence: Option<String>,
    #[serde(default)]
    pub osm_type: Option<String>,
    #[serde(default)]
    pub osm_id: Option<u64>,
    /// `[south, north, west, east]` as decimal strings.
    #[serde(default)]
    pub boundingbox: Option<[String; 4]>,
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub importance: Option<f64>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Present when the request asked for `addressdetails=1`.
    #[serde(default)]
    pub address: Option<Map<String, Value>>,
}

/// `/reverse` answers with either a place or an `{"error": ...}` object
/// when nothing is found at the given position.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ReverseResponse {
    Place(Box<Place>),
    NotFound { error: String },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn place_parses_minimal_payload() {
        let place: Place = serde_json::from_value(json!({
            "place_id": 42,
            "lat": "51.5136",
            "lon": "7.4653",
            "display_name": "Dortmund, Germany"
        }))
        .unwrap();
        assert_eq!(place.place_id, 42);
        assert!(place.boundingbox.is_none());
        assert!(place.kind.is_none());
    }

    #[test]
    fn place_maps_type_field() {
        let place: Place = serde_json::from_value(json!({
            "place_id": 1,
            "lat": "0",
            "lon": "0",
            "display_name": "x",
            "class": "boundary",
            "type": "administrative",
            "boundingbox": ["51.41", "51.60", "7.30", "7.64"]
        }))
        .unwrap();
        assert_eq!(place.class.as_deref(), Some("boundary"));
        assert_eq!(place.kind.as_deref(), Some("administrative"));
        assert_eq!(place.boundingbox.unwrap()[3], "7.64");
    }

    #[test]
    fn reverse_error_object_is_not_found() {
        let resp: ReverseResponse =
            serde_json::from_value(json!({ "error": "Unable to geocode" })).unwrap();
        assert!(matches!(resp, ReverseResponse::NotFound { .. }));
    }
}
