// ── External map renderer ──
//
// The engine never renders. It drives whatever map widget the host
// provides through `MapView` and listens to its event broadcast.

use tokio::sync::broadcast;

use crate::model::{AoiId, BoundingBox, Coordinate, LatLng, Viewport};

/// Pointer and view events emitted by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    Click(Coordinate),
    DoubleClick(Coordinate),
    /// The user clicked a rendered AOI.
    FeatureClick(AoiId),
    /// A pan or zoom gesture ended; read the new view with `MapView::view`.
    MoveEnd,
    /// The user pressed Escape.
    Escape,
}

/// Handle to a live map view.
///
/// Implementations must be cheap to call from the binding task; they
/// should enqueue work on the renderer rather than block on it.
pub trait MapView: Send + Sync {
    /// What the map shows right now.
    fn view(&self) -> Viewport;

    fn set_view(&self, center: LatLng, zoom: u8, animate: bool);

    fn fly_to(&self, center: LatLng, zoom: u8);

    fn fit_bounds(&self, bounds: BoundingBox, padding: u32);

    /// A fresh receiver for map events. Dropping it unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<MapEvent>;
}
