// ── AOI state and persistence ──

mod aoi_store;
mod storage;

pub use aoi_store::{AoiState, AoiStore};
pub use storage::{AoiStorage, JsonFileStorage, MemoryStorage, StorageError};
