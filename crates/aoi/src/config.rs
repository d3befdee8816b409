//! Resolves the effective configuration and opens the engine from it.
//!
//! Precedence: CLI flags > `AOI_*` environment > config file > defaults.

use std::sync::Arc;

use aoi_api::GeocodingClient;
use aoi_config::Config;
use aoi_core::{AoiStorage, JsonFileStorage, MemoryStorage, Workspace};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Load the config file named by `--config` (or the default path) and
/// apply flag overrides on top.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(aoi_config::config_path);
    let mut cfg = aoi_config::load_config_from(&path)?;
    apply_overrides(&mut cfg, global);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, global: &GlobalOpts) {
    if let Some(ref dir) = global.storage_dir {
        cfg.storage_dir = Some(dir.clone());
    }
    if let Some(ref url) = global.geocoder_url {
        cfg.geocoder.url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.geocoder.timeout = timeout;
    }
}

/// Open the persisted workspace. With `volatile` set nothing is written
/// back; the saved state is still loaded so defaults (names, palette) match.
pub fn open_workspace(cfg: &Config, volatile: bool) -> Workspace {
    let dir = cfg.storage_dir();
    tracing::debug!(dir = %dir.display(), volatile, "opening workspace");
    let disk = JsonFileStorage::new(dir);
    let storage: Arc<dyn AoiStorage> = if volatile {
        let aois = disk.load_aois().unwrap_or_default();
        let viewport = disk.load_viewport().unwrap_or_default();
        Arc::new(MemoryStorage::with_state(aois, viewport))
    } else {
        Arc::new(disk)
    };
    Workspace::open(storage, cfg.to_engine_config())
}

pub fn geocoder(cfg: &Config) -> Result<GeocodingClient, CliError> {
    let geocoder_config = cfg.to_geocoder_config()?;
    Ok(GeocodingClient::new(&geocoder_config)?)
}
