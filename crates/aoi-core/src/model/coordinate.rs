// ── Positions and extents ──
//
// Two position conventions meet in this engine: GeoJSON geometry stores
// (longitude, latitude), while map renderers address their center as
// (latitude, longitude). Each gets its own type so they cannot be mixed.

use serde::{Deserialize, Serialize};

// ── Coordinate ──────────────────────────────────────────────────────

/// A GeoJSON position. Serialized as `[lng, lat]`.
///
/// Ranges are not enforced; callers hand in what the map reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(c: Coordinate) -> Self {
        [c.lng, c.lat]
    }
}

impl From<LatLng> for Coordinate {
    fn from(ll: LatLng) -> Self {
        Self::new(ll.lng, ll.lat)
    }
}

// ── LatLng ──────────────────────────────────────────────────────────

/// A map center in renderer order. Serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(ll: LatLng) -> Self {
        [ll.lat, ll.lng]
    }
}

impl From<Coordinate> for LatLng {
    fn from(c: Coordinate) -> Self {
        Self::new(c.lat, c.lng)
    }
}

// ── BoundingBox ─────────────────────────────────────────────────────

/// Axis-aligned extent in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Smallest box covering every coordinate. `None` for an empty input.
    pub fn from_coordinates<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Option<Self> {
        coords.into_iter().fold(None, |acc, c| {
            let point = Self {
                west: c.lng,
                south: c.lat,
                east: c.lng,
                north: c.lat,
            };
            Some(acc.map_or(point, |b: Self| b.union(point)))
        })
    }

    /// Smallest box covering both boxes.
    pub fn union(self, other: Self) -> Self {
        Self {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        c.lng >= self.west && c.lng <= self.east && c.lat >= self.south && c.lat <= self.north
    }
}

/// Fixed-precision rendering for display (`51.478200`).
pub fn format_coordinate(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}
