// ── Persistence backends ──
//
// Flat load/save of the AOI collection and the viewport. The store calls
// these synchronously on every write and swallows failures with a warning.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::{Aoi, Viewport};

const AOIS_FILE: &str = "aois.json";
const VIEWPORT_FILE: &str = "viewport.json";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt data in {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

// ── Trait ───────────────────────────────────────────────────────────

/// Key-value persistence for the two durable state slices.
pub trait AoiStorage: Send + Sync {
    /// An absent collection loads as empty.
    fn load_aois(&self) -> Result<Vec<Aoi>, StorageError>;

    fn save_aois(&self, aois: &[Arc<Aoi>]) -> Result<(), StorageError>;

    /// `None` when no viewport was ever saved.
    fn load_viewport(&self) -> Result<Option<Viewport>, StorageError>;

    fn save_viewport(&self, viewport: &Viewport) -> Result<(), StorageError>;
}

// ── JSON files ──────────────────────────────────────────────────────

/// One JSON document per slice inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn aois_path(&self) -> PathBuf {
        self.dir.join(AOIS_FILE)
    }

    pub fn viewport_path(&self) -> PathBuf {
        self.dir.join(VIEWPORT_FILE)
    }

    fn read<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Io {
                    path: path.to_owned(),
                    source,
                });
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                path: path.to_owned(),
                source,
            })
    }

    /// Write to a sibling temp file, then rename over the target.
    fn write<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: path.to_owned(),
            source,
        };
        let json = serde_json::to_vec_pretty(value)?;
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }
}

impl AoiStorage for JsonFileStorage {
    fn load_aois(&self) -> Result<Vec<Aoi>, StorageError> {
        Ok(Self::read(&self.aois_path())?.unwrap_or_default())
    }

    fn save_aois(&self, aois: &[Arc<Aoi>]) -> Result<(), StorageError> {
        self.write(&self.aois_path(), aois)
    }

    fn load_viewport(&self) -> Result<Option<Viewport>, StorageError> {
        Self::read(&self.viewport_path())
    }

    fn save_viewport(&self, viewport: &Viewport) -> Result<(), StorageError> {
        self.write(&self.viewport_path(), viewport)
    }
}

// ── In-memory ───────────────────────────────────────────────────────

/// Volatile backend for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    aois: Mutex<Vec<Aoi>>,
    viewport: Mutex<Option<Viewport>>,
    fail_writes: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a collection and viewport.
    pub fn with_state(aois: Vec<Aoi>, viewport: Option<Viewport>) -> Self {
        Self {
            aois: Mutex::new(aois),
            viewport: Mutex::new(viewport),
            ..Self::default()
        }
    }

    /// Make every subsequent save fail with `StorageError::Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves of either slice.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn saved_aois(&self) -> Vec<Aoi> {
        self.aois.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn saved_viewport(&self) -> Option<Viewport> {
        self.viewport.lock().ok().and_then(|g| *g)
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }

    fn poisoned() -> StorageError {
        StorageError::Unavailable("memory storage lock poisoned".into())
    }
}

impl AoiStorage for MemoryStorage {
    fn load_aois(&self) -> Result<Vec<Aoi>, StorageError> {
        self.aois.lock().map(|g| g.clone()).map_err(|_| Self::poisoned())
    }

    fn save_aois(&self, aois: &[Arc<Aoi>]) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self.aois.lock().map_err(|_| Self::poisoned())?;
        *guard = aois.iter().map(|a| Aoi::clone(a)).collect();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_viewport(&self) -> Result<Option<Viewport>, StorageError> {
        self.viewport.lock().map(|g| *g).map_err(|_| Self::poisoned())
    }

    fn save_viewport(&self, viewport: &Viewport) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self.viewport.lock().map_err(|_| Self::poisoned())?;
        *guard = Some(*viewport);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
