// ── Runtime engine configuration ──
//
// Tuning knobs for the workspace. Never touches disk; `aoi-config`
// builds one of these from the user's config file and hands it in.

use crate::model::Viewport;

/// Colors assigned to new AOIs when the caller does not pick one.
pub const DEFAULT_PALETTE: [&str; 5] = ["#3B82F6", "#EF4444", "#10B981", "#F59E0B", "#8B5CF6"];

/// Zoom level used by `fly_to` when none is given.
pub const DEFAULT_FLY_TO_ZOOM: u8 = 14;

/// Pixel padding around an AOI when fitting the map to it.
pub const DEFAULT_FIT_PADDING: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub palette: Vec<String>,
    /// Used when persistence has no saved viewport.
    pub default_viewport: Viewport,
    pub fly_to_zoom: u8,
    pub fit_padding: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.iter().map(|c| (*c).to_owned()).collect(),
            default_viewport: Viewport::default(),
            fly_to_zoom: DEFAULT_FLY_TO_ZOOM,
            fit_padding: DEFAULT_FIT_PADDING,
        }
    }
}
