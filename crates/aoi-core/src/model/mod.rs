// ── Domain model ──
//
// Canonical types shared by the drawing machine, the AOI store, the
// viewport synchronizer and the search session.

pub mod aoi;
pub mod coordinate;
pub mod geometry;
pub mod search;
pub mod viewport;

pub use aoi::{Aoi, AoiDraft, AoiId, AoiUpdate, Properties, feature_collection};
pub use coordinate::{BoundingBox, Coordinate, LatLng, format_coordinate};
pub use geometry::Geometry;
pub use search::{SearchResult, SearchState};
pub use viewport::{Viewport, ViewportUpdate};
