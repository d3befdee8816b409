// ── Geometry ──
//
// The three GeoJSON geometry kinds the drawing tools can produce.
// Serialized exactly as GeoJSON: `{"type": "...", "coordinates": ...}`.

use serde::{Deserialize, Serialize};

use super::coordinate::{BoundingBox, Coordinate};

/// A drawn shape.
///
/// A `Polygon` holds exactly one outer ring whose first and last
/// coordinates are identical. Constructors in `draw::builder` are the
/// only producers inside the engine and always close the ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coordinate),
    LineString(Vec<Coordinate>),
    Polygon(Vec<Vec<Coordinate>>),
}

impl Geometry {
    /// Wrap a single closed ring as a polygon.
    pub fn polygon(ring: Vec<Coordinate>) -> Self {
        Self::Polygon(vec![ring])
    }

    /// GeoJSON type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Point(_) => "Point",
            Self::LineString(_) => "LineString",
            Self::Polygon(_) => "Polygon",
        }
    }

    /// The outer ring of a polygon.
    pub fn outer_ring(&self) -> Option<&[Coordinate]> {
        match self {
            Self::Polygon(rings) => rings.first().map(Vec::as_slice),
            _ => None,
        }
    }

    /// `true` for polygons whose outer ring is closed with at least four
    /// positions. Other geometry kinds are trivially valid.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Point(_) => true,
            Self::LineString(coords) => coords.len() >= 2,
            Self::Polygon(_) => self
                .outer_ring()
                .is_some_and(|ring| ring.len() >= 4 && ring.first() == ring.last()),
        }
    }

    /// Every position in the geometry, in storage order.
    pub fn positions(&self) -> Box<dyn Iterator<Item = &Coordinate> + '_> {
        match self {
            Self::Point(c) => Box::new(std::iter::once(c)),
            Self::LineString(coords) => Box::new(coords.iter()),
            Self::Polygon(rings) => Box::new(rings.iter().flatten()),
        }
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_coordinates(self.positions())
    }
}
