// ── Geometry builder ──
//
// Pure functions from an ordered coordinate sequence plus a build mode
// to a candidate geometry. No state, no side effects.

use crate::model::{Coordinate, Geometry};

/// Which shape to assemble from the collected coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Point,
    /// Open preview line, used while a polygon has only two vertices.
    Line,
    Polygon,
    Rectangle,
}

/// Outcome of one build step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Build {
    pub geometry: Option<Geometry>,
    /// `true` when the geometry is final and the session should end.
    pub complete: bool,
}

impl Build {
    fn none() -> Self {
        Self::default()
    }

    fn preview(geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            complete: false,
        }
    }

    fn done(geometry: Geometry) -> Self {
        Self {
            geometry: Some(geometry),
            complete: true,
        }
    }
}

/// Assemble a geometry from `coords`.
///
/// - `Point` needs exactly one coordinate and always completes.
/// - `Line` needs at least two and never completes.
/// - `Polygon` needs at least three; it completes only when `finish` is set.
/// - `Rectangle` needs exactly two opposite corners and always completes.
///
/// Any other count yields no geometry.
pub fn build(mode: BuildMode, coords: &[Coordinate], finish: bool) -> Build {
    match (mode, coords) {
        (BuildMode::Point, [c]) => Build::done(Geometry::Point(*c)),
        (BuildMode::Line, c) if c.len() >= 2 => Build::preview(Geometry::LineString(c.to_vec())),
        (BuildMode::Polygon, c) if c.len() >= 3 => {
            let polygon = Geometry::polygon(close_ring(c));
            if finish {
                Build::done(polygon)
            } else {
                Build::preview(polygon)
            }
        }
        (BuildMode::Rectangle, [p1, p2]) => Build::done(Geometry::polygon(rectangle_ring(*p1, *p2))),
        _ => Build::none(),
    }
}

/// Copy `coords` and append the first coordinate to close the ring.
pub fn close_ring(coords: &[Coordinate]) -> Vec<Coordinate> {
    let mut ring = Vec::with_capacity(coords.len() + 1);
    ring.extend_from_slice(coords);
    if let Some(first) = coords.first() {
        ring.push(*first);
    }
    ring
}

/// Axis-aligned ring through two opposite corners, in drawing order.
pub fn rectangle_ring(p1: Coordinate, p2: Coordinate) -> Vec<Coordinate> {
    vec![
        p1,
        Coordinate::new(p2.lng, p1.lat),
        p2,
        Coordinate::new(p1.lng, p2.lat),
        p1,
    ]
}
