// ── Area of Interest ──
//
// The persisted record for every shape the user keeps. Only the store
// creates `Aoi` values; everything else receives `Arc<Aoi>` snapshots.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::coordinate::BoundingBox;
use super::geometry::Geometry;

/// Open map of auxiliary fields (shape kind, sequence number, ...).
pub type Properties = Map<String, Value>;

// ── AoiId ───────────────────────────────────────────────────────────

/// Opaque, unique AOI identifier (`aoi_{unix_millis}_{uuid}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AoiId(String);

impl AoiId {
    /// Mint a fresh identifier.
    pub fn generate() -> Self {
        Self(format!(
            "aoi_{}_{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AoiId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<String> for AoiId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AoiId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── Aoi ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aoi {
    pub id: AoiId,
    pub name: String,
    pub geometry: Geometry,
    /// Display hint (`#RRGGBB`), never interpreted by the engine.
    pub color: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub properties: Properties,
}

impl Aoi {
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.geometry.bounds()
    }

    /// The drawing tool that produced this AOI, if recorded.
    pub fn shape_kind(&self) -> Option<&str> {
        self.properties.get("type").and_then(Value::as_str)
    }

    /// Position in creation sequence, if recorded.
    pub fn area_number(&self) -> Option<u64> {
        self.properties.get("areaNumber").and_then(Value::as_u64)
    }

    /// Render as a GeoJSON `Feature`.
    pub fn to_feature(&self) -> Value {
        json!({
            "type": "Feature",
            "id": self.id,
            "geometry": self.geometry,
            "properties": {
                "id": self.id,
                "name": self.name,
                "color": self.color,
                "type": self.shape_kind().unwrap_or("polygon"),
                "areaNumber": self.area_number().unwrap_or(1),
                "createdAt": self.created_at,
            }
        })
    }
}

/// Render a set of AOIs as a GeoJSON `FeatureCollection`.
pub fn feature_collection<'a>(aois: impl IntoIterator<Item = &'a Aoi>) -> Value {
    let features: Vec<Value> = aois.into_iter().map(Aoi::to_feature).collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

// ── Mutation payloads ───────────────────────────────────────────────

/// Input to `AoiStore::add`. Missing fields get store defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AoiDraft {
    pub name: Option<String>,
    pub geometry: Geometry,
    pub color: Option<String>,
    pub properties: Option<Properties>,
}

impl AoiDraft {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            name: None,
            geometry,
            color: None,
            properties: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// Partial update for `AoiStore::update`. `None` leaves a field as is;
/// `properties` replaces the whole map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AoiUpdate {
    pub name: Option<String>,
    pub geometry: Option<Geometry>,
    pub color: Option<String>,
    pub properties: Option<Properties>,
}

impl AoiUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.geometry.is_none()
            && self.color.is_none()
            && self.properties.is_none()
    }

    /// Merge into an existing record. `id` and `created_at` are never touched.
    pub(crate) fn apply(self, aoi: &mut Aoi) {
        if let Some(name) = self.name {
            aoi.name = name;
        }
        if let Some(geometry) = self.geometry {
            aoi.geometry = geometry;
        }
        if let Some(color) = self.color {
            aoi.color = color;
        }
        if let Some(properties) = self.properties {
            aoi.properties = properties;
        }
    }
}
