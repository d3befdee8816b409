// ── AOI store ──
//
// Authoritative owner of the AOI collection, the selection and the
// viewport. Every mutation publishes a fresh immutable snapshot through a
// `watch` channel and then persists synchronously.

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::storage::AoiStorage;
use crate::config::{DEFAULT_PALETTE, EngineConfig};
use crate::model::{Aoi, AoiDraft, AoiId, AoiUpdate, BoundingBox, Viewport, ViewportUpdate};
use crate::stream::StateStream;

/// Collection plus selection, published together so that removing the
/// selected AOI and clearing the selection is one observable step.
#[derive(Debug, Clone, Default)]
pub struct AoiState {
    /// Insertion-ordered; cheap to clone.
    pub aois: Arc<IndexMap<AoiId, Arc<Aoi>>>,
    /// Not validated against `aois`.
    pub selected: Option<AoiId>,
}

impl AoiState {
    pub fn get(&self, id: &AoiId) -> Option<&Arc<Aoi>> {
        self.aois.get(id)
    }

    pub fn selected_aoi(&self) -> Option<&Arc<Aoi>> {
        self.selected.as_ref().and_then(|id| self.aois.get(id))
    }

    pub fn len(&self) -> usize {
        self.aois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aois.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Aoi>> {
        self.aois.values()
    }
}

pub struct AoiStore {
    state: watch::Sender<AoiState>,
    viewport: watch::Sender<Viewport>,
    storage: Arc<dyn AoiStorage>,
    palette: Vec<String>,
}

impl AoiStore {
    /// Build a store from whatever `storage` holds.
    ///
    /// Load failures are logged and leave the corresponding slice at its
    /// default: an empty collection and `config.default_viewport`.
    pub fn load(storage: Arc<dyn AoiStorage>, config: &EngineConfig) -> Self {
        let aois = storage.load_aois().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load AOIs, starting empty");
            Vec::new()
        });
        let viewport = storage
            .load_viewport()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to load viewport, using default");
                None
            })
            .unwrap_or(config.default_viewport);

        let map: IndexMap<AoiId, Arc<Aoi>> = aois
            .into_iter()
            .map(|aoi| (aoi.id.clone(), Arc::new(aoi)))
            .collect();
        debug!(count = map.len(), "AOI store loaded");

        let (state, _) = watch::channel(AoiState {
            aois: Arc::new(map),
            selected: None,
        });
        let (viewport, _) = watch::channel(viewport);

        Self {
            state,
            viewport,
            storage,
            palette: config.palette.clone(),
        }
    }

    // ── Collection mutations ─────────────────────────────────────────

    /// Insert a new AOI and return its id.
    ///
    /// Missing fields are filled in: name `"Area {n}"` where `n` is the
    /// collection size after insertion, and a random palette color.
    pub fn add(&self, draft: AoiDraft) -> AoiId {
        let id = AoiId::generate();
        let color = draft.color.unwrap_or_else(|| self.pick_color());
        let created_at = Utc::now();

        self.state.send_modify(|state| {
            let aoi = Aoi {
                id: id.clone(),
                name: draft
                    .name
                    .unwrap_or_else(|| format!("Area {}", state.aois.len() + 1)),
                geometry: draft.geometry,
                color,
                created_at,
                properties: draft.properties.unwrap_or_default(),
            };
            info!(id = %aoi.id, name = %aoi.name, kind = aoi.geometry.type_name(), "AOI added");
            Arc::make_mut(&mut state.aois).insert(id.clone(), Arc::new(aoi));
        });

        self.persist_aois();
        id
    }

    /// Merge `update` into the AOI with `id`. Returns `false` (and does
    /// nothing) when no such AOI exists.
    pub fn update(&self, id: &AoiId, update: AoiUpdate) -> bool {
        let found = self.state.send_if_modified(|state| {
            if !state.aois.contains_key(id) {
                return false;
            }
            if let Some(entry) = Arc::make_mut(&mut state.aois).get_mut(id) {
                update.apply(Arc::make_mut(entry));
            }
            true
        });

        if found {
            debug!(%id, "AOI updated");
            self.persist_aois();
        } else {
            debug!(%id, "update ignored, no such AOI");
        }
        found
    }

    /// Delete the AOI with `id`, clearing the selection if it pointed at it.
    /// Returns `false` when no such AOI exists.
    pub fn remove(&self, id: &AoiId) -> bool {
        let removed = self.state.send_if_modified(|state| {
            if Arc::make_mut(&mut state.aois).shift_remove(id).is_none() {
                return false;
            }
            if state.selected.as_ref() == Some(id) {
                state.selected = None;
            }
            true
        });

        if removed {
            info!(%id, "AOI removed");
            self.persist_aois();
        } else {
            debug!(%id, "remove ignored, no such AOI");
        }
        removed
    }

    /// Drop every AOI and the selection.
    pub fn clear(&self) {
        self.state.send_modify(|state| {
            state.aois = Arc::new(IndexMap::new());
            state.selected = None;
        });
        info!("all AOIs cleared");
        self.persist_aois();
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Select an AOI by id, or clear the selection. The id is not checked.
    pub fn set_selected(&self, id: Option<AoiId>) {
        self.state.send_if_modified(|state| {
            if state.selected == id {
                return false;
            }
            state.selected = id;
            true
        });
    }

    // ── Viewport ─────────────────────────────────────────────────────

    /// Merge a partial viewport change. Persists only when it changed
    /// something; returns whether it did.
    pub fn set_viewport(&self, update: ViewportUpdate) -> bool {
        let changed = self.viewport.send_if_modified(|v| v.merge(update));
        if changed {
            let viewport = *self.viewport.borrow();
            debug!(
                lat = viewport.center.lat,
                lng = viewport.center.lng,
                zoom = viewport.zoom,
                "viewport changed"
            );
            if let Err(e) = self.storage.save_viewport(&viewport) {
                warn!(error = %e, "failed to persist viewport");
            }
        }
        changed
    }

    // ── Read accessors ───────────────────────────────────────────────

    /// Current collection and selection (cheap `Arc` clone).
    pub fn snapshot(&self) -> AoiState {
        self.state.borrow().clone()
    }

    /// AOIs in insertion order.
    pub fn aois(&self) -> Vec<Arc<Aoi>> {
        self.state.borrow().aois.values().cloned().collect()
    }

    pub fn get(&self, id: &AoiId) -> Option<Arc<Aoi>> {
        self.state.borrow().aois.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().aois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().aois.is_empty()
    }

    pub fn selected(&self) -> Option<AoiId> {
        self.state.borrow().selected.clone()
    }

    pub fn viewport(&self) -> Viewport {
        *self.viewport.borrow()
    }

    /// Union extent of every AOI, `None` when the collection is empty.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.state
            .borrow()
            .aois
            .values()
            .filter_map(|aoi| aoi.bounds())
            .reduce(BoundingBox::union)
    }

    pub fn subscribe(&self) -> StateStream<AoiState> {
        StateStream::new(self.state.subscribe())
    }

    pub fn subscribe_viewport(&self) -> StateStream<Viewport> {
        StateStream::new(self.viewport.subscribe())
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn pick_color(&self) -> String {
        self.palette
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| DEFAULT_PALETTE[0].to_owned())
    }

    /// Write the current collection. Failures are logged, never returned.
    fn persist_aois(&self) {
        let snapshot = self.aois();
        if let Err(e) = self.storage.save_aois(&snapshot) {
            warn!(error = %e, count = snapshot.len(), "failed to persist AOIs");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Coordinate, Geometry, LatLng, Properties};
    use crate::store::{JsonFileStorage, MemoryStorage};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn store() -> (Arc<MemoryStorage>, AoiStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = AoiStore::load(storage.clone(), &EngineConfig::default());
        (storage, store)
    }

    fn point(lng: f64, lat: f64) -> AoiDraft {
        AoiDraft::new(Geometry::Point(Coordinate::new(lng, lat)))
    }

    #[test]
    fn add_fills_defaults() {
        let (storage, store) = store();
        let first = store.add(point(7.0, 51.0));
        let second = store.add(point(7.1, 51.1));

        let a = store.get(&first).unwrap();
        let b = store.get(&second).unwrap();
        assert_eq!(a.name, "Area 1");
        assert_eq!(b.name, "Area 2");
        assert!(DEFAULT_PALETTE.contains(&a.color.as_str()));
        assert_ne!(a.id, b.id);
        assert!(a.created_at <= b.created_at);

        let order: Vec<_> = store.aois().iter().map(|a| a.id.clone()).collect();
        assert_eq!(order, vec![first, second]);
        assert_eq!(storage.saved_aois().len(), 2);
    }

    #[test]
    fn add_respects_explicit_fields() {
        let (_, store) = store();
        let mut props = Properties::new();
        props.insert("source".into(), json!("import"));
        let id = store.add(
            point(7.0, 51.0)
                .with_name("Depot")
                .with_color("#000000")
                .with_properties(props.clone()),
        );
        let aoi = store.get(&id).unwrap();
        assert_eq!(aoi.name, "Depot");
        assert_eq!(aoi.color, "#000000");
        assert_eq!(aoi.properties, props);
    }

    #[test]
    fn update_merges_and_persists() {
        let (storage, store) = store();
        let id = store.add(point(7.0, 51.0));
        let created_at = store.get(&id).unwrap().created_at;

        assert!(store.update(
            &id,
            AoiUpdate {
                name: Some("Renamed".into()),
                ..AoiUpdate::default()
            }
        ));
        let aoi = store.get(&id).unwrap();
        assert_eq!(aoi.name, "Renamed");
        assert_eq!(aoi.created_at, created_at);
        assert_eq!(storage.saved_aois()[0].name, "Renamed");
    }

    #[test]
    fn missing_ids_are_ignored() {
        let (storage, store) = store();
        store.add(point(7.0, 51.0));
        let saves = storage.save_count();

        let ghost = AoiId::from("aoi_missing");
        assert!(!store.update(&ghost, AoiUpdate::default()));
        assert!(!store.remove(&ghost));
        assert_eq!(store.len(), 1);
        assert_eq!(storage.save_count(), saves);
    }

    #[test]
    fn removing_selected_clears_selection() {
        let (_, store) = store();
        let a = store.add(point(7.0, 51.0));
        let b = store.add(point(7.1, 51.0));

        store.set_selected(Some(a.clone()));
        assert!(store.remove(&b));
        assert_eq!(store.selected(), Some(a.clone()));
        assert!(store.get(&b).is_none());

        assert!(store.remove(&a));
        assert_eq!(store.selected(), None);
        assert!(store.get(&a).is_none());
    }

    #[tokio::test]
    async fn remove_and_deselect_publish_together() {
        let (_, store) = store();
        let a = store.add(point(7.0, 51.0));
        store.set_selected(Some(a.clone()));

        let mut stream = store.subscribe();
        store.remove(&a);
        let snap = stream.changed().await.unwrap();
        assert!(snap.is_empty());
        assert!(snap.selected.is_none());
    }

    #[test]
    fn selection_is_not_validated() {
        let (_, store) = store();
        store.set_selected(Some(AoiId::from("nowhere")));
        assert_eq!(store.selected(), Some(AoiId::from("nowhere")));
        assert!(store.snapshot().selected_aoi().is_none());
    }

    #[test]
    fn clear_empties_and_persists() {
        let (storage, store) = store();
        let id = store.add(point(7.0, 51.0));
        store.set_selected(Some(id));
        store.clear();
        assert!(store.is_empty());
        assert!(store.selected().is_none());
        assert!(storage.saved_aois().is_empty());
    }

    #[test]
    fn persistence_failure_still_updates_memory() {
        let (storage, store) = store();
        storage.set_fail_writes(true);
        let id = store.add(point(7.0, 51.0));
        assert!(store.get(&id).is_some());
        assert!(storage.saved_aois().is_empty());
    }

    #[test]
    fn load_restores_collection_and_viewport() {
        let (storage, store) = store();
        store.add(point(7.0, 51.0));
        store.add(point(8.0, 52.0));
        store.set_viewport(ViewportUpdate::center(LatLng::new(52.0, 8.0)).with_zoom(12));

        let reloaded = AoiStore::load(storage.clone(), &EngineConfig::default());
        let before: Vec<Aoi> = store.aois().iter().map(|a| Aoi::clone(a)).collect();
        let after: Vec<Aoi> = reloaded.aois().iter().map(|a| Aoi::clone(a)).collect();
        assert_eq!(before, after);
        assert_eq!(reloaded.viewport(), Viewport::new(LatLng::new(52.0, 8.0), 12));
    }

    #[test]
    fn viewport_persists_only_on_change() {
        let (storage, store) = store();
        assert!(!store.set_viewport(ViewportUpdate::from(Viewport::default())));
        assert_eq!(storage.save_count(), 0);

        assert!(store.set_viewport(ViewportUpdate::zoom(13)));
        assert_eq!(storage.saved_viewport().unwrap().zoom, 13);
    }

    #[test]
    fn bounds_cover_every_aoi() {
        let (_, store) = store();
        assert!(store.bounds().is_none());
        store.add(point(7.0, 51.0));
        store.add(point(8.0, 52.5));
        let b = store.bounds().unwrap();
        assert_eq!((b.west, b.south, b.east, b.north), (7.0, 51.0, 8.0, 52.5));
    }

    #[test]
    fn corrupt_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(JsonFileStorage::new(dir.path()));
        std::fs::write(storage.aois_path(), "[{ broken").unwrap();
        std::fs::write(storage.viewport_path(), "{\"center\": 12").unwrap();

        let config = EngineConfig {
            default_viewport: Viewport::new(LatLng::new(48.1, 11.6), 9),
            ..EngineConfig::default()
        };
        let store = AoiStore::load(storage.clone(), &config);
        assert!(store.is_empty());
        assert_eq!(store.viewport(), config.default_viewport);

        let id = store.add(point(7.0, 51.0));
        assert_eq!(store.get(&id).unwrap().name, "Area 1");
        let reloaded = AoiStore::load(storage, &config);
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn viewport_save_failure_still_updates_memory() {
        let (storage, store) = store();
        storage.set_fail_writes(true);

        assert!(store.set_viewport(ViewportUpdate::center(LatLng::new(52.0, 8.0))));
        assert_eq!(store.viewport().center, LatLng::new(52.0, 8.0));
        assert_eq!(storage.save_count(), 0);
        assert_eq!(storage.saved_viewport(), None);
    }
}
