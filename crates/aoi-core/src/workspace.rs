// ── Workspace ──
//
// Application root: one AOI store, one drawing machine, and the map
// handle threaded in at mount time. Routes renderer events into the
// engine and keeps the store viewport and the map in step.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::draw::{CompletedShape, DrawMode, DrawingMachine};
use crate::model::{AoiDraft, AoiId, BoundingBox, LatLng, Properties, Viewport, ViewportUpdate};
use crate::store::{AoiStorage, AoiStore};
use crate::stream::StateStream;
use crate::viewport::{MapEvent, MapView, pull_from_map, push_to_map};

/// Cheaply cloneable handle to the engine.
#[derive(Clone)]
pub struct Workspace {
    inner: Arc<WorkspaceInner>,
}

struct WorkspaceInner {
    config: EngineConfig,
    store: AoiStore,
    drawing: DrawingMachine,
    binding: Mutex<Option<ActiveBinding>>,
    generation: AtomicU64,
}

/// The one live map binding. `generation` identifies which `MapBinding`
/// owns the slot.
struct ActiveBinding {
    map: Arc<dyn MapView>,
    generation: u64,
    cancel: CancellationToken,
}

impl Workspace {
    pub fn new(store: AoiStore, config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(WorkspaceInner {
                config,
                store,
                drawing: DrawingMachine::new(),
                binding: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Load the store from `storage` and wrap it.
    pub fn open(storage: Arc<dyn AoiStorage>, config: EngineConfig) -> Self {
        let store = AoiStore::load(storage, &config);
        Self::new(store, config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &AoiStore {
        &self.inner.store
    }

    pub fn drawing(&self) -> &DrawingMachine {
        &self.inner.drawing
    }

    // ── Drawing ──────────────────────────────────────────────────────

    /// Enter a drawing mode. Clears the selection.
    pub fn start_drawing(&self, mode: DrawMode) {
        self.inner.store.set_selected(None);
        self.inner.drawing.start(mode);
    }

    /// Feed a pointer position; returns the new AOI if it completed a shape.
    pub fn add_coordinate(&self, lng: f64, lat: f64) -> Option<AoiId> {
        let shape = self.inner.drawing.add_coordinate(lng, lat)?;
        Some(self.commit(shape))
    }

    /// Close the polygon in progress; `None` if there is nothing to close.
    pub fn finish_drawing(&self) -> Option<AoiId> {
        let shape = self.inner.drawing.finish()?;
        Some(self.commit(shape))
    }

    pub fn cancel_drawing(&self) {
        self.inner.drawing.cancel();
    }

    /// Store a completed shape, recording its draw mode and sequence number.
    pub fn commit(&self, shape: CompletedShape) -> AoiId {
        self.commit_with(shape, None, None)
    }

    /// Like `commit`, with an explicit name and color in place of the
    /// store defaults. The record is written once.
    pub fn commit_with(
        &self,
        shape: CompletedShape,
        name: Option<String>,
        color: Option<String>,
    ) -> AoiId {
        let area_number = self.inner.store.len() + 1;
        let mut properties = Properties::new();
        properties.insert("type".into(), json!(shape.kind.to_string()));
        properties.insert("areaNumber".into(), json!(area_number));

        let mut draft = AoiDraft::new(shape.geometry).with_properties(properties);
        draft.name = name;
        draft.color = color;
        self.inner.store.add(draft)
    }

    // ── Selection and navigation ─────────────────────────────────────

    pub fn select(&self, id: Option<AoiId>) {
        self.inner.store.set_selected(id);
    }

    /// Select an AOI and bring it into view. Returns `false` if it does not exist.
    pub fn focus(&self, id: &AoiId) -> bool {
        let Some(aoi) = self.inner.store.get(id) else {
            debug!(%id, "focus ignored, no such AOI");
            return false;
        };
        self.inner.store.set_selected(Some(id.clone()));
        if let Some(bounds) = aoi.bounds() {
            self.show_bounds(bounds);
        }
        true
    }

    /// Bring every AOI into view. Returns `false` when there are none.
    pub fn fit_all(&self) -> bool {
        match self.inner.store.bounds() {
            Some(bounds) => {
                self.show_bounds(bounds);
                true
            }
            None => false,
        }
    }

    /// Center the map on a position, at `zoom` or the configured fly-to zoom.
    ///
    /// Without an attached map the store viewport is written directly.
    pub fn fly_to(&self, lat: f64, lng: f64, zoom: Option<u8>) {
        let center = LatLng::new(lat, lng);
        let zoom = zoom.unwrap_or(self.inner.config.fly_to_zoom);
        match self.map() {
            Some(map) => map.fly_to(center, zoom),
            None => {
                self.inner
                    .store
                    .set_viewport(ViewportUpdate::center(center).with_zoom(zoom));
            }
        }
    }

    fn show_bounds(&self, bounds: BoundingBox) {
        let degenerate = bounds.west == bounds.east && bounds.south == bounds.north;
        match self.map() {
            Some(map) if degenerate => map.fly_to(bounds.center(), self.inner.config.fly_to_zoom),
            Some(map) => map.fit_bounds(bounds, self.inner.config.fit_padding),
            None => {
                self.inner
                    .store
                    .set_viewport(ViewportUpdate::center(bounds.center()));
            }
        }
    }

    // ── Map events ───────────────────────────────────────────────────

    /// Route one renderer event. Returns the id of an AOI it created.
    pub fn handle_map_event(&self, event: MapEvent) -> Option<AoiId> {
        match event {
            MapEvent::Click(c) => {
                if self.inner.drawing.is_drawing() {
                    return self.add_coordinate(c.lng, c.lat);
                }
                self.inner.store.set_selected(None);
                None
            }
            MapEvent::DoubleClick(_) => {
                if self.inner.drawing.mode() == Some(DrawMode::Polygon) {
                    return self.finish_drawing();
                }
                None
            }
            MapEvent::FeatureClick(id) => {
                if !self.inner.drawing.is_drawing() {
                    self.inner.store.set_selected(Some(id));
                }
                None
            }
            MapEvent::MoveEnd => {
                if let Some(map) = self.map() {
                    pull_from_map(map.as_ref(), &self.inner.store);
                }
                None
            }
            MapEvent::Escape => {
                self.cancel_drawing();
                None
            }
        }
    }

    // ── Map binding ──────────────────────────────────────────────────

    /// Bind a live map view to this workspace.
    ///
    /// Pushes the store viewport to the map, then spawns a task that
    /// routes map events and follows store viewport changes until the
    /// returned binding is dropped or detached. At most one binding is
    /// live: attaching again stops the previous binding's task. Must be
    /// called from within a Tokio runtime.
    pub fn attach_map(&self, map: Arc<dyn MapView>) -> MapBinding {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();

        if let Ok(mut slot) = self.inner.binding.lock() {
            let previous = slot.replace(ActiveBinding {
                map: Arc::clone(&map),
                generation,
                cancel: cancel.clone(),
            });
            if let Some(previous) = previous {
                previous.cancel.cancel();
                debug!(previous = previous.generation, "replaced map binding");
            }
        }

        let events = map.subscribe();
        let viewport = self.inner.store.subscribe_viewport();
        push_to_map(map.as_ref(), viewport.current());

        let handle = tokio::spawn(binding_task(
            self.clone(),
            Arc::clone(&map),
            events,
            viewport,
            cancel.clone(),
        ));
        info!(generation, "map attached");

        MapBinding {
            workspace: self.clone(),
            generation,
            cancel,
            handle: Some(handle),
        }
    }

    /// The currently attached map, if any.
    pub fn map(&self) -> Option<Arc<dyn MapView>> {
        self.inner
            .binding
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|b| Arc::clone(&b.map)))
    }

    /// Clear the slot if `generation` still owns it.
    fn release_map(&self, generation: u64) {
        if let Ok(mut slot) = self.inner.binding.lock() {
            if slot.as_ref().is_some_and(|b| b.generation == generation) {
                *slot = None;
                debug!(generation, "map released");
            }
        }
    }

    pub fn subscribe_viewport(&self) -> StateStream<Viewport> {
        self.inner.store.subscribe_viewport()
    }
}

/// Keeps a map bound to a workspace. Dropping it stops the binding task
/// and releases the map.
pub struct MapBinding {
    workspace: Workspace,
    generation: u64,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl MapBinding {
    /// Stop the binding and wait for its task to exit.
    pub async fn detach(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    /// `false` once detached, dropped or replaced by a later `attach_map`.
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl Drop for MapBinding {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.workspace.release_map(self.generation);
    }
}

async fn binding_task(
    workspace: Workspace,
    map: Arc<dyn MapView>,
    mut events: broadcast::Receiver<MapEvent>,
    mut viewport: StateStream<Viewport>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = events.recv() => match event {
                Ok(event) => {
                    workspace.handle_map_event(event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "map event receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            changed = viewport.changed() => {
                let Some(target) = changed else { break };
                push_to_map(map.as_ref(), &target);
            }
        }
    }
    debug!("map binding stopped");
}
