// ── Core error types ──
//
// User-facing errors from aoi-core. Consumers never see raw HTTP status
// handling or JSON parse failures from the geocoder directly; the
// `From<aoi_api::Error>` impl translates them into domain variants.

use thiserror::Error;

use crate::store::StorageError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Geocoder errors ──────────────────────────────────────────────
    #[error("Cannot reach geocoder at {url}: {reason}")]
    GeocoderUnavailable { url: String, reason: String },

    #[error("Geocoder request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Geocoder error: {message}")]
    Geocoder {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Persistence errors ───────────────────────────────────────────
    #[error(transparent)]
    Storage(#[from] StorageError),

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<aoi_api::Error> for CoreError {
    fn from(err: aoi_api::Error) -> Self {
        match err {
            aoi_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::GeocoderUnavailable {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Geocoder {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            aoi_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid geocoder URL: {e}"),
            },
            aoi_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            aoi_api::Error::Http { status, message } => CoreError::Geocoder {
                message: format!("HTTP {status}: {message}"),
                status: Some(status),
            },
            aoi_api::Error::RateLimited { retry_after_secs } => CoreError::Geocoder {
                message: format!("rate limited, retry after {retry_after_secs}s"),
                status: Some(429),
            },
            aoi_api::Error::Deserialization { message, .. } => CoreError::Geocoder {
                message: format!("unexpected response: {message}"),
                status: None,
            },
        }
    }
}
