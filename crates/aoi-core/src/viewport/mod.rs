// ── Viewport synchronization ──
//
// Bidirectional binding between the store viewport and an external map.

mod map;
mod sync;

pub use map::{MapEvent, MapView};
pub use sync::{VIEW_EPSILON, needs_sync, pull_from_map, push_to_map};
