// ── Viewport ──

use serde::{Deserialize, Serialize};

use super::coordinate::LatLng;

/// The store's idea of what the map shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
}

impl Viewport {
    pub const fn new(center: LatLng, zoom: u8) -> Self {
        Self { center, zoom }
    }

    /// Merge a partial update. Returns `true` if anything changed.
    pub fn merge(&mut self, update: ViewportUpdate) -> bool {
        let next = Self {
            center: update.center.unwrap_or(self.center),
            zoom: update.zoom.unwrap_or(self.zoom),
        };
        let changed = next != *self;
        *self = next;
        changed
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::new(51.4782, 7.555), 10)
    }
}

/// Partial viewport change for `AoiStore::set_viewport`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportUpdate {
    pub center: Option<LatLng>,
    pub zoom: Option<u8>,
}

impl ViewportUpdate {
    pub fn center(center: LatLng) -> Self {
        Self {
            center: Some(center),
            zoom: None,
        }
    }

    pub fn zoom(zoom: u8) -> Self {
        Self {
            center: None,
            zoom: Some(zoom),
        }
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = Some(zoom);
        self
    }
}

impl From<Viewport> for ViewportUpdate {
    fn from(v: Viewport) -> Self {
        Self {
            center: Some(v.center),
            zoom: Some(v.zoom),
        }
    }
}
