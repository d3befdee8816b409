//! Shared configuration for the AOI CLI.
//!
//! TOML file + `AOI_` environment overrides, merged over defaults with
//! figment, and translation to `aoi_core::EngineConfig` and
//! `aoi_api::GeocoderConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use aoi_api::{GeocoderConfig, SearchOptions, TransportConfig};
use aoi_core::{DEFAULT_PALETTE, EngineConfig, LatLng, Viewport};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Directory holding `aois.json` and `viewport.json`. Defaults to the
    /// platform data directory.
    pub storage_dir: Option<PathBuf>,

    #[serde(default)]
    pub geocoder: GeocoderSection,

    #[serde(default)]
    pub viewport: ViewportSection,

    /// Colors assigned to new AOIs.
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,

    #[serde(default = "default_fly_to_zoom")]
    pub fly_to_zoom: u8,

    /// Pixels of padding when fitting the map to an AOI.
    #[serde(default = "default_fit_padding")]
    pub fit_padding: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: None,
            geocoder: GeocoderSection::default(),
            viewport: ViewportSection::default(),
            palette: default_palette(),
            fly_to_zoom: default_fly_to_zoom(),
            fit_padding: default_fit_padding(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeocoderSection {
    #[serde(default = "default_geocoder_url")]
    pub url: String,

    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Empty searches worldwide.
    #[serde(default = "default_country_codes")]
    pub country_codes: Vec<String>,

    #[serde(default = "default_true")]
    pub address_details: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    pub user_agent: Option<String>,
}

impl Default for GeocoderSection {
    fn default() -> Self {
        Self {
            url: default_geocoder_url(),
            limit: default_limit(),
            country_codes: default_country_codes(),
            address_details: true,
            timeout: default_timeout(),
            user_agent: None,
        }
    }
}

/// Starting view when nothing has been saved yet.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ViewportSection {
    #[serde(default = "default_lat")]
    pub lat: f64,

    #[serde(default = "default_lng")]
    pub lng: f64,

    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

impl Default for ViewportSection {
    fn default() -> Self {
        Self {
            lat: default_lat(),
            lng: default_lng(),
            zoom: default_zoom(),
        }
    }
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| (*c).to_owned()).collect()
}
fn default_fly_to_zoom() -> u8 {
    aoi_core::config::DEFAULT_FLY_TO_ZOOM
}
fn default_fit_padding() -> u32 {
    aoi_core::config::DEFAULT_FIT_PADDING
}
fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org/".into()
}
fn default_limit() -> u32 {
    10
}
fn default_country_codes() -> Vec<String> {
    vec!["de".into()]
}
fn default_true() -> bool {
    true
}
fn default_timeout() -> u64 {
    30
}
fn default_lat() -> f64 {
    Viewport::default().center.lat
}
fn default_lng() -> f64 {
    Viewport::default().center.lng
}
fn default_zoom() -> u8 {
    Viewport::default().zoom
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "aoi", "aoi")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location for persisted AOIs.
pub fn default_storage_dir() -> PathBuf {
    project_dirs().map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("data");
            p
        },
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("aoi");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("AOI_").split("__"))
}

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file (which may be absent) + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-90.0..=90.0).contains(&self.viewport.lat) {
            return Err(ConfigError::Validation {
                field: "viewport.lat".into(),
                reason: format!("{} is outside -90..=90", self.viewport.lat),
            });
        }
        if !(-180.0..=180.0).contains(&self.viewport.lng) {
            return Err(ConfigError::Validation {
                field: "viewport.lng".into(),
                reason: format!("{} is outside -180..=180", self.viewport.lng),
            });
        }
        if self.geocoder.limit == 0 {
            return Err(ConfigError::Validation {
                field: "geocoder.limit".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Where AOIs are persisted.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(default_storage_dir)
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        let palette = if self.palette.is_empty() {
            default_palette()
        } else {
            self.palette.clone()
        };
        EngineConfig {
            palette,
            default_viewport: Viewport::new(
                LatLng::new(self.viewport.lat, self.viewport.lng),
                self.viewport.zoom,
            ),
            fly_to_zoom: self.fly_to_zoom,
            fit_padding: self.fit_padding,
        }
    }

    pub fn to_geocoder_config(&self) -> Result<GeocoderConfig, ConfigError> {
        let base_url: url::Url =
            self.geocoder
                .url
                .parse()
                .map_err(|_| ConfigError::Validation {
                    field: "geocoder.url".into(),
                    reason: format!("invalid URL: {}", self.geocoder.url),
                })?;

        let mut transport =
            TransportConfig::default().with_timeout(Duration::from_secs(self.geocoder.timeout));
        if let Some(ref ua) = self.geocoder.user_agent {
            transport = transport.with_user_agent(ua.clone());
        }

        Ok(GeocoderConfig {
            base_url,
            options: SearchOptions {
                limit: self.geocoder.limit,
                country_codes: self.geocoder.country_codes.clone(),
                address_details: self.geocoder.address_details,
            },
            transport,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_engine_defaults() {
        let cfg = Config::default();
        let engine = cfg.to_engine_config();
        assert_eq!(engine, EngineConfig::default());

        let geo = cfg.to_geocoder_config().unwrap();
        assert_eq!(geo.base_url.as_str(), "https://nominatim.openstreetmap.org/");
        assert_eq!(geo.options, SearchOptions::default());
        assert_eq!(geo.transport.timeout, Duration::from_secs(30));
    }

    #[test]
    fn file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r##"
                    storage_dir = "/tmp/aois"
                    palette = ["#000000"]

                    [geocoder]
                    url = "https://geo.example.com/nominatim"
                    country_codes = []
                    timeout = 5

                    [viewport]
                    lat = 52.52
                    lng = 13.405
                "##,
            )?;
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.storage_dir(), PathBuf::from("/tmp/aois"));
            assert_eq!(cfg.viewport.zoom, 10);
            assert!(cfg.geocoder.country_codes.is_empty());
            assert_eq!(cfg.geocoder.limit, 10);

            let engine = cfg.to_engine_config();
            assert_eq!(engine.palette, vec!["#000000".to_owned()]);
            assert_eq!(engine.default_viewport.center, LatLng::new(52.52, 13.405));
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "fly_to_zoom = 12")?;
            jail.set_env("AOI_FLY_TO_ZOOM", "16");
            jail.set_env("AOI_GEOCODER__LIMIT", "3");
            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.fly_to_zoom, 16);
            assert_eq!(cfg.geocoder.limit, 3);
            Ok(())
        });
    }

    #[test]
    fn rejects_out_of_range_viewport() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "[viewport]\nlat = 123.0")?;
            let err = load_config_from(Path::new("config.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "viewport.lat"));
            Ok(())
        });
    }

    #[test]
    fn invalid_geocoder_url_is_reported() {
        let mut cfg = Config::default();
        cfg.geocoder.url = "not a url".into();
        assert!(cfg.to_geocoder_config().is_err());
    }

    #[test]
    fn saved_config_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.fit_padding = 40;
        cfg.storage_dir = Some(dir.path().join("data"));
        save_config_to(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let reloaded: Config = toml::from_str(&text).unwrap();
        assert_eq!(reloaded, cfg);
    }

    #[test]
    fn canonical_path_round_trips_under_home() {
        figment::Jail::expect_with(|jail| {
            let home = jail.directory().to_path_buf();
            jail.set_env("HOME", home.display());
            jail.set_env("XDG_CONFIG_HOME", home.join(".config").display());
            assert!(config_path().starts_with(&home));

            assert_eq!(load_config_or_default(), Config::default());

            let mut cfg = Config::default();
            cfg.fit_padding = 32;
            save_config(&cfg).unwrap();
            assert!(config_path().is_file());
            assert_eq!(load_config().unwrap().fit_padding, 32);
            Ok(())
        });
    }

    #[test]
    fn invalid_canonical_file_falls_back_to_default() {
        figment::Jail::expect_with(|jail| {
            let home = jail.directory().to_path_buf();
            jail.set_env("HOME", home.display());
            jail.set_env("XDG_CONFIG_HOME", home.join(".config").display());
            let path = config_path();
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "[viewport]\nlat = 123.0").unwrap();

            assert!(load_config().is_err());
            assert_eq!(load_config_or_default(), Config::default());
            Ok(())
        });
    }
}
