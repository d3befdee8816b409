// ── Two-way viewport binding ──
//
// Store -> map pushes are gated by a tolerance so that a view the map
// just reported does not bounce back as a redundant `set_view`.

use tracing::trace;

use super::map::MapView;
use crate::model::{Viewport, ViewportUpdate};
use crate::store::AoiStore;

/// Center tolerance in degrees.
pub const VIEW_EPSILON: f64 = 1e-4;

/// `true` when `target` differs from `live` by more than the tolerance.
pub fn needs_sync(live: &Viewport, target: &Viewport) -> bool {
    (live.center.lat - target.center.lat).abs() > VIEW_EPSILON
        || (live.center.lng - target.center.lng).abs() > VIEW_EPSILON
        || live.zoom != target.zoom
}

/// Move the map to `target` unless it is already there. Returns whether a
/// `set_view` was issued.
pub fn push_to_map(map: &dyn MapView, target: &Viewport) -> bool {
    let live = map.view();
    if !needs_sync(&live, target) {
        trace!("map already at store viewport");
        return false;
    }
    map.set_view(target.center, target.zoom, true);
    true
}

/// Copy the map's live view into the store.
pub fn pull_from_map(map: &dyn MapView, store: &AoiStore) -> bool {
    store.set_viewport(ViewportUpdate::from(map.view()))
}
