//! Drawing state machine and AOI/viewport engine.
//!
//! This crate owns the domain model and the reactive state for drawing
//! Areas of Interest on an external map:
//!
//! - **[`Workspace`]**: Application root. Owns one [`AoiStore`] and one
//!   [`DrawingMachine`], routes [`MapEvent`]s from the renderer and binds a
//!   [`MapView`] through [`Workspace::attach_map`].
//!
//! - **[`DrawingMachine`]**: Turns pointer coordinates into closed
//!   geometries using the pure functions in [`draw::builder`].
//!
//! - **[`AoiStore`]**: Authoritative AOI collection, selection and
//!   viewport, published through `tokio::sync::watch` snapshots and
//!   persisted through an [`AoiStorage`] backend.
//!
//! - **[`SearchSession`]**: Last-call-wins location lookup over any
//!   [`Geocoder`], including `aoi_api::GeocodingClient`.
//!
//! - **[`StateStream<T>`]**: Subscription handle with `current()` /
//!   `latest()` / `changed()` for reactive presentation.

pub mod config;
pub mod convert;
pub mod draw;
pub mod error;
pub mod model;
pub mod search;
pub mod store;
pub mod stream;
pub mod viewport;
pub mod workspace;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_PALETTE, EngineConfig};
pub use draw::{CompletedShape, DrawMode, DrawingMachine, DrawingState};
pub use error::CoreError;
pub use search::{Geocoder, SearchSession};
pub use store::{AoiState, AoiStorage, AoiStore, JsonFileStorage, MemoryStorage, StorageError};
pub use stream::StateStream;
pub use viewport::{MapEvent, MapView, VIEW_EPSILON};
pub use workspace::{MapBinding, Workspace};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Aoi, AoiDraft, AoiId, AoiUpdate, BoundingBox, Coordinate, Geometry, LatLng, Properties,
    SearchResult, SearchState, Viewport, ViewportUpdate, feature_collection, format_coordinate,
};
