// ── Location search ──

use serde::{Deserialize, Serialize};

use super::coordinate::{BoundingBox, LatLng};

/// One geocoder hit, already parsed into typed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub place_id: u64,
    pub display_name: String,
    pub location: LatLng,
    pub bounds: Option<BoundingBox>,
    pub class: Option<String>,
    pub kind: Option<String>,
    pub importance: Option<f64>,
}

/// The single logical search slice read by presentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub is_searching: bool,
}
