// End-to-end tests for `Workspace` with a recording map view.
#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tokio_stream::StreamExt;

use aoi_core::{
    Coordinate, DrawMode, EngineConfig, JsonFileStorage, LatLng, MapEvent, MapView,
    MemoryStorage, Viewport, ViewportUpdate, Workspace, feature_collection,
};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum MapCall {
    SetView(LatLng, u8),
    FlyTo(LatLng, u8),
    FitBounds(u32),
}

struct RecordingMap {
    view: Mutex<Viewport>,
    calls: Mutex<Vec<MapCall>>,
    events: broadcast::Sender<MapEvent>,
}

impl RecordingMap {
    fn at(lat: f64, lng: f64, zoom: u8) -> Arc<Self> {
        let (events, _) = broadcast::channel(32);
        Arc::new(Self {
            view: Mutex::new(Viewport::new(LatLng::new(lat, lng), zoom)),
            calls: Mutex::new(Vec::new()),
            events,
        })
    }

    fn calls(&self) -> Vec<MapCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Simulate a user pan: move the view, then announce it.
    fn pan_to(&self, lat: f64, lng: f64, zoom: u8) {
        *self.view.lock().unwrap() = Viewport::new(LatLng::new(lat, lng), zoom);
        self.emit(MapEvent::MoveEnd);
    }

    fn emit(&self, event: MapEvent) {
        self.events.send(event).unwrap();
    }
}

impl MapView for RecordingMap {
    fn view(&self) -> Viewport {
        *self.view.lock().unwrap()
    }

    fn set_view(&self, center: LatLng, zoom: u8, _animate: bool) {
        *self.view.lock().unwrap() = Viewport::new(center, zoom);
        self.calls.lock().unwrap().push(MapCall::SetView(center, zoom));
    }

    fn fly_to(&self, center: LatLng, zoom: u8) {
        self.calls.lock().unwrap().push(MapCall::FlyTo(center, zoom));
    }

    fn fit_bounds(&self, _bounds: aoi_core::BoundingBox, padding: u32) {
        self.calls.lock().unwrap().push(MapCall::FitBounds(padding));
    }

    fn subscribe(&self) -> broadcast::Receiver<MapEvent> {
        self.events.subscribe()
    }
}

fn workspace_at(lat: f64, lng: f64, zoom: u8) -> Workspace {
    let storage = MemoryStorage::with_state(
        Vec::new(),
        Some(Viewport::new(LatLng::new(lat, lng), zoom)),
    );
    Workspace::open(Arc::new(storage), EngineConfig::default())
}

/// Let the binding task drain whatever is queued.
async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

// ── Viewport binding ────────────────────────────────────────────────

#[tokio::test]
async fn test_attach_within_tolerance_issues_no_set_view() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(51.50003, 7.00002, 10);

    let _binding = ws.attach_map(map.clone());
    settle().await;

    assert!(map.calls().is_empty());
}

#[tokio::test]
async fn test_attach_pushes_store_viewport() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(0.0, 0.0, 3);

    let _binding = ws.attach_map(map.clone());

    assert_eq!(
        map.calls(),
        vec![MapCall::SetView(LatLng::new(51.5, 7.0), 10)]
    );
}

#[tokio::test]
async fn test_store_change_moves_map() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(51.5, 7.0, 10);
    let _binding = ws.attach_map(map.clone());

    ws.store()
        .set_viewport(ViewportUpdate::center(LatLng::new(52.0, 8.0)));
    settle().await;

    assert_eq!(
        map.calls(),
        vec![MapCall::SetView(LatLng::new(52.0, 8.0), 10)]
    );
}

#[tokio::test]
async fn test_map_pan_updates_store_without_echo() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(51.5, 7.0, 10);
    let _binding = ws.attach_map(map.clone());

    map.pan_to(51.7, 7.3, 12);
    settle().await;

    assert_eq!(ws.store().viewport(), Viewport::new(LatLng::new(51.7, 7.3), 12));
    assert!(map.calls().is_empty());
}

// ── Event routing ───────────────────────────────────────────────────

#[tokio::test]
async fn test_polygon_drawn_through_map_events() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(51.5, 7.0, 10);
    let _binding = ws.attach_map(map.clone());

    ws.start_drawing(DrawMode::Polygon);
    map.emit(MapEvent::Click(Coordinate::new(7.0, 51.0)));
    map.emit(MapEvent::Click(Coordinate::new(7.1, 51.0)));
    map.emit(MapEvent::Click(Coordinate::new(7.05, 51.1)));
    map.emit(MapEvent::DoubleClick(Coordinate::new(7.05, 51.1)));
    settle().await;

    let aois = ws.store().aois();
    assert_eq!(aois.len(), 1);
    let ring = aois[0].geometry.outer_ring().unwrap();
    assert_eq!(ring.len(), 4);
    assert_eq!(ring.first(), ring.last());
    assert!(ws.drawing().state().is_idle());
}

#[tokio::test]
async fn test_focus_fits_bounds_with_padding() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(51.5, 7.0, 10);
    let _binding = ws.attach_map(map.clone());

    ws.start_drawing(DrawMode::Rectangle);
    ws.add_coordinate(7.0, 51.0);
    let id = ws.add_coordinate(7.2, 51.2).unwrap();

    assert!(ws.focus(&id));
    assert_eq!(ws.store().selected(), Some(id));
    assert_eq!(map.calls(), vec![MapCall::FitBounds(20)]);
}

#[tokio::test]
async fn test_fly_to_uses_attached_map() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(51.5, 7.0, 10);
    let _binding = ws.attach_map(map.clone());

    ws.fly_to(52.52, 13.405, None);

    assert_eq!(
        map.calls(),
        vec![MapCall::FlyTo(LatLng::new(52.52, 13.405), 14)]
    );
    assert_eq!(ws.store().viewport().center, LatLng::new(51.5, 7.0));
}

// ── Teardown ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_detach_stops_routing() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(51.5, 7.0, 10);
    let binding = ws.attach_map(map.clone());
    assert!(ws.map().is_some());

    binding.detach().await;
    assert!(ws.map().is_none());

    ws.start_drawing(DrawMode::Point);
    let _ = map.events.send(MapEvent::Click(Coordinate::new(7.0, 51.0)));
    settle().await;
    assert!(ws.store().is_empty());
}

#[tokio::test]
async fn test_dropping_binding_releases_map() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(51.5, 7.0, 10);
    {
        let _binding = ws.attach_map(map.clone());
    }
    assert!(ws.map().is_none());

    ws.fly_to(48.0, 11.0, Some(9));
    assert!(map.calls().is_empty());
    assert_eq!(ws.store().viewport(), Viewport::new(LatLng::new(48.0, 11.0), 9));
}

#[tokio::test]
async fn test_reattach_then_dropping_old_binding_keeps_sync() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(51.5, 7.0, 10);
    let first = ws.attach_map(map.clone());
    let second = ws.attach_map(map.clone());
    assert!(!first.is_active());
    assert!(second.is_active());

    drop(first);
    assert!(ws.map().is_some());

    map.pan_to(51.7, 7.3, 12);
    settle().await;
    assert_eq!(ws.store().viewport(), Viewport::new(LatLng::new(51.7, 7.3), 12));

    drop(second);
    assert!(ws.map().is_none());
}

#[tokio::test]
async fn test_double_attach_routes_click_once() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(51.5, 7.0, 10);
    let _first = ws.attach_map(map.clone());
    let _second = ws.attach_map(map.clone());

    ws.start_drawing(DrawMode::Polygon);
    map.emit(MapEvent::Click(Coordinate::new(7.0, 51.0)));
    settle().await;

    assert_eq!(ws.drawing().state().temp_coordinates.len(), 1);
}

#[tokio::test]
async fn test_attach_other_map_replaces_previous() {
    let ws = workspace_at(51.5, 7.0, 10);
    let old_map = RecordingMap::at(51.5, 7.0, 10);
    let new_map = RecordingMap::at(51.5, 7.0, 10);
    let old = ws.attach_map(old_map.clone());
    let _new = ws.attach_map(new_map.clone());
    assert!(!old.is_active());

    ws.start_drawing(DrawMode::Point);
    let _ = old_map.events.send(MapEvent::Click(Coordinate::new(7.0, 51.0)));
    settle().await;
    assert!(ws.store().is_empty());

    ws.store()
        .set_viewport(ViewportUpdate::center(LatLng::new(52.0, 8.0)));
    settle().await;
    assert!(old_map.calls().is_empty());
    assert_eq!(
        new_map.calls(),
        vec![MapCall::SetView(LatLng::new(52.0, 8.0), 10)]
    );
}

// ── Streams ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_viewport_stream_follows_map_pans() {
    let ws = workspace_at(51.5, 7.0, 10);
    let map = RecordingMap::at(51.5, 7.0, 10);
    let _binding = ws.attach_map(map.clone());
    let mut viewports = ws.subscribe_viewport().into_stream();

    assert_eq!(
        viewports.next().await,
        Some(Viewport::new(LatLng::new(51.5, 7.0), 10))
    );

    map.pan_to(51.7, 7.3, 12);
    assert_eq!(
        viewports.next().await,
        Some(Viewport::new(LatLng::new(51.7, 7.3), 12))
    );
}

// ── Persistence ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_reopened_workspace_restores_everything() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(JsonFileStorage::new(dir.path()));

    let ws = Workspace::open(storage.clone(), EngineConfig::default());
    ws.start_drawing(DrawMode::Point);
    ws.add_coordinate(7.0, 51.0);
    ws.start_drawing(DrawMode::Rectangle);
    ws.add_coordinate(7.0, 51.0);
    ws.add_coordinate(7.2, 51.2);
    ws.fly_to(51.3, 7.1, Some(11));
    let before = ws.store().aois();

    let reopened = Workspace::open(storage, EngineConfig::default());
    let after = reopened.store().aois();
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a, b);
    }
    assert_eq!(
        reopened.store().viewport(),
        Viewport::new(LatLng::new(51.3, 7.1), 11)
    );

    let fc = feature_collection(after.iter().map(|a| &**a));
    assert_eq!(fc["features"][1]["properties"]["type"], "rectangle");
    assert_eq!(fc["features"][1]["properties"]["areaNumber"], 2);
    assert_eq!(fc["features"][1]["properties"]["name"], "Area 2");
}
