// ── Drawing state machine ──
//
// Idle -> Active(mode) -> Idle. Owns only the transient session; a
// finished shape is handed out by value and the machine returns to Idle.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use tokio::sync::watch;
use tracing::debug;

use super::builder::{self, BuildMode};
use crate::model::{Coordinate, Geometry};
use crate::stream::StateStream;

/// Drawing tool selected by the user.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DrawMode {
    Point,
    Polygon,
    Rectangle,
}

impl DrawMode {
    fn build_mode(self) -> BuildMode {
        match self {
            Self::Point => BuildMode::Point,
            Self::Polygon => BuildMode::Polygon,
            Self::Rectangle => BuildMode::Rectangle,
        }
    }
}

/// Snapshot of the drawing session.
///
/// `mode == None` means Idle, in which case `is_drawing` is `false` and
/// `temp_coordinates` is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingState {
    pub mode: Option<DrawMode>,
    pub is_drawing: bool,
    pub temp_coordinates: Vec<Coordinate>,
    /// In-progress preview for the renderer.
    pub current_feature: Option<Geometry>,
}

impl DrawingState {
    fn active(mode: DrawMode) -> Self {
        Self {
            mode: Some(mode),
            is_drawing: true,
            temp_coordinates: Vec::new(),
            current_feature: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.mode.is_none()
    }
}

/// A geometry the user finished drawing, ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedShape {
    pub kind: DrawMode,
    pub geometry: Geometry,
}

/// Converts a stream of pointer coordinates into closed geometries.
pub struct DrawingMachine {
    state: watch::Sender<DrawingState>,
}

impl Default for DrawingMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingMachine {
    pub fn new() -> Self {
        let (state, _) = watch::channel(DrawingState::default());
        Self { state }
    }

    /// Begin a new session, discarding any session in progress.
    pub fn start(&self, mode: DrawMode) {
        debug!(%mode, "drawing started");
        self.state.send_replace(DrawingState::active(mode));
    }

    /// Feed one pointer position. Returns the shape if it completed it.
    ///
    /// Ignored while idle.
    pub fn add_coordinate(&self, lng: f64, lat: f64) -> Option<CompletedShape> {
        let mut completed = None;

        self.state.send_if_modified(|state| {
            let Some(mode) = state.mode else {
                return false;
            };
            state.temp_coordinates.push(Coordinate::new(lng, lat));

            let coords = &state.temp_coordinates;
            let result = builder::build(mode.build_mode(), coords, false);

            if result.complete {
                if let Some(geometry) = result.geometry {
                    completed = Some(CompletedShape {
                        kind: mode,
                        geometry,
                    });
                }
                *state = DrawingState::default();
            } else if mode == DrawMode::Polygon && coords.len() == 2 {
                state.current_feature = builder::build(BuildMode::Line, coords, false).geometry;
            } else {
                state.current_feature = result.geometry;
            }
            true
        });

        if let Some(shape) = &completed {
            debug!(kind = %shape.kind, "drawing completed");
        }
        completed
    }

    /// Close the polygon in progress.
    ///
    /// Only meaningful for a polygon session with at least three vertices;
    /// anything else is a no-op returning `None`.
    pub fn finish(&self) -> Option<CompletedShape> {
        let mut completed = None;

        self.state.send_if_modified(|state| {
            if state.mode != Some(DrawMode::Polygon) || state.temp_coordinates.len() < 3 {
                return false;
            }
            let result = builder::build(BuildMode::Polygon, &state.temp_coordinates, true);
            completed = result.geometry.map(|geometry| CompletedShape {
                kind: DrawMode::Polygon,
                geometry,
            });
            *state = DrawingState::default();
            true
        });

        if completed.is_some() {
            debug!("polygon finished");
        }
        completed
    }

    /// Abandon the session. Always succeeds; a no-op when already idle.
    pub fn cancel(&self) {
        let cancelled = self.state.send_if_modified(|state| {
            if *state == DrawingState::default() {
                return false;
            }
            *state = DrawingState::default();
            true
        });
        if cancelled {
            debug!("drawing cancelled");
        }
    }

    // ── Read accessors ───────────────────────────────────────────────

    pub fn state(&self) -> DrawingState {
        self.state.borrow().clone()
    }

    pub fn mode(&self) -> Option<DrawMode> {
        self.state.borrow().mode
    }

    pub fn is_drawing(&self) -> bool {
        self.state.borrow().is_drawing
    }

    pub fn subscribe(&self) -> StateStream<DrawingState> {
        StateStream::new(self.state.subscribe())
    }
}
